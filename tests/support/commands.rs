//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a bunker command with an isolated environment:
    /// HOME and XDG dirs in the temp home, the config in the test dir,
    /// colors off.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("bunker").expect("failed to find bunker binary");
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("XDG_CONFIG_HOME", self.home.path().join(".config"));
        cmd.env("XDG_DATA_HOME", self.home.path().join(".local/share"));
        cmd.env("GNUPGHOME", self.home.path().join(".gnupg"));
        cmd.env("BUNKER_CONFIG", self.config_path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("BUNKER_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Run bunker with `args` and no stdin.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run bunker")
    }

    /// Run bunker with `args`, piping `stdin`.
    pub fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Output {
        self.cmd()
            .args(args)
            .write_stdin(stdin)
            .output()
            .expect("failed to run bunker")
    }

    /// `bunker init` with a plain root store at `<dir>/root`.
    pub fn init_cmd(&self) -> Output {
        let root = self.store_dir("root");
        self.run(&[
            "init",
            "--cipher",
            "plain",
            "--allow-plaintext",
            "--path",
            root.to_str().expect("utf-8 temp path"),
        ])
    }

    /// `bunker insert <path>` with content on stdin.
    pub fn insert(&self, path: &str, content: &str) -> Output {
        self.run_with_stdin(&["insert", path], content)
    }

    /// `bunker insert --force <path>` with content on stdin.
    pub fn insert_force(&self, path: &str, content: &str) -> Output {
        self.run_with_stdin(&["insert", "--force", path], content)
    }

    /// `bunker show <path>`.
    pub fn show(&self, path: &str) -> Output {
        self.run(&["show", path])
    }

    /// `bunker show -n <path>`.
    pub fn show_raw(&self, path: &str) -> Output {
        self.run(&["show", "-n", path])
    }

    /// `bunker show <path> <key>`.
    pub fn show_key(&self, path: &str, key: &str) -> Output {
        self.run(&["show", path, key])
    }

    /// `bunker rm <path>`.
    pub fn rm(&self, path: &str) -> Output {
        self.run(&["rm", path])
    }

    /// `bunker ls`.
    pub fn ls(&self) -> Output {
        self.run(&["ls"])
    }

    /// `bunker ls --json`.
    pub fn ls_json(&self) -> Output {
        self.run(&["ls", "--json"])
    }

    /// `bunker mounts add <prefix> <dir>/<name>` with the plain cipher.
    pub fn mount(&self, prefix: &str, name: &str) -> Output {
        let dir = self.store_dir(name);
        self.run(&[
            "mounts",
            "add",
            prefix,
            dir.to_str().expect("utf-8 temp path"),
            "--cipher",
            "plain",
        ])
    }
}
