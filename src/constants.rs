pub mod launcher {
    pub const PROGRAM: &str = "java";
    pub const NATIVE_ACCESS_FLAGS: &[&str] = &["--enable-native-access=ALL-UNNAMED"];
    pub const ENTRY_POINT: &str = "com.marijoa.rfid.Bridge";
    pub const LIBRARY_PATH_PROPERTY: &str = "-Djava.library.path=";
    pub const CLASSPATH_FLAG: &str = "-cp";
    pub const WINDOWS_LIBRARY_PATH: &str = r"natives\windows";
    pub const WINDOWS_CLASSPATH: &str = r"out;libs\*";
    pub const UNIX_LIBRARY_PATH: &str = "natives/linux";
    pub const UNIX_CLASSPATH: &str = "out:libs/*";
}

pub mod limits {
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
    pub const DEFAULT_MAX_CAPTURE_BYTES: usize = 1024 * 1024;
    pub const READ_CHUNK_BYTES: usize = 8192;
    pub const LOG_SNIPPET_BYTES: usize = 512;
    pub const MAX_FORM_BODY_BYTES: u64 = 64 * 1024;
}

pub mod network {
    pub const DEFAULT_LISTEN: &str = "127.0.0.1:8088";
    pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
    pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
}

pub mod filter {
    pub const SENTINELS: &[&str] = &["OK", "NO_TAG"];
    pub const PREFIXES: &[&str] = &["DETECTED=", "WRITTEN=", "ERROR=", "EPC="];
}

pub mod request {
    pub const ACTION_KEY: &str = "action";
}
