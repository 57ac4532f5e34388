use std::path::PathBuf;
use thiserror::Error;

/// Structural failure while decoding one class file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("bad magic 0x{found:08X} (expected 0xCAFEBABE)")]
    BadMagic { found: u32 },

    #[error("unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("truncated class file: needed {needed} byte(s) at offset {offset}, {available} left")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("constant pool index {index} out of range (pool count {count})")]
    ConstantIndexOutOfRange { index: u16, count: u16 },

    #[error("constant pool entry {index} is not a {expected} entry")]
    UnexpectedConstant { index: u16, expected: &'static str },

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { tag: u8, index: u16 },
}

/// Failure of a dump run, tagged with the entry or file that caused it.
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("malformed class file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to write report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

impl DumpError {
    pub fn read(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// The relative entry path or file path the error is about.
    pub fn path(&self) -> String {
        match self {
            Self::Parse { path, .. } | Self::Read { path, .. } => path.clone(),
            Self::Archive { path, .. } | Self::Write { path, .. } => path.display().to_string(),
            Self::Walk { root, .. } => root.display().to_string(),
        }
    }
}
