/// Skip a test if the gpg binary is not on PATH.
#[macro_export]
macro_rules! skip_without_gpg {
    () => {
        if which::which("gpg").is_err() && which::which("gpg2").is_err() {
            eprintln!("SKIPPED: gpg not installed");
            return;
        }
    };
}
