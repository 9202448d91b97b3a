//! Shared fixtures for integration tests.

#![allow(dead_code)]

use md5::{Digest, Md5};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gatekeeper::config::FileConfigSource;
use gatekeeper::lifecycle::Gatekeeper;
use gatekeeper::refresh::RefreshRegistry;

pub const API_KEY: &str = "test-admin-key";

pub fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

/// A scratch directory holding a config file and its datasets.
pub struct Deployment {
    pub dir: tempfile::TempDir,
}

impl Deployment {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn config_path(&self) -> PathBuf {
        self.path("gatekeeper.toml")
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }

    /// Write a config pointing at `groups`, `fixed`, `variable` and
    /// `passwords` inside the deployment directory.
    pub fn write_config(&self, whitelist_enabled: bool, password_enabled: bool) {
        let config = format!(
            r#"
[groups]
file = "{groups}"

[whitelist]
enabled = {whitelist_enabled}
fixed_file = "{fixed}"
variable_file = "{variable}"

[password]
enabled = {password_enabled}
file = "{passwords}"

[admin]
api_key = "{API_KEY}"
"#,
            groups = toml_path(&self.path("groups")),
            fixed = toml_path(&self.path("fixed")),
            variable = toml_path(&self.path("variable")),
            passwords = toml_path(&self.path("passwords")),
        );
        fs::write(self.config_path(), config).unwrap();
    }

    /// The standard datasets used across tests.
    pub fn write_datasets(&self) {
        self.write("groups", "user2=group1\nuser3=group2,group3\n");
        self.write("fixed", "10.0.0.1\n");
        self.write("variable", "192.168.1.2:user1,user2\n");
        self.write(
            "passwords",
            &format!("user5:{}:true\nuser6::true\nuser7:{}:false\n", md5_hex("cccccc"), md5_hex("x")),
        );
    }

    pub fn start(&self) -> Gatekeeper {
        Gatekeeper::init(
            Arc::new(FileConfigSource::new(self.config_path())),
            Arc::new(RefreshRegistry::new()),
        )
        .unwrap()
    }
}

fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}
