use chrono::{DateTime, Local, Utc};
use std::fmt::{self, Display, Formatter};

/// Kind of an archive entry.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum EntryKind {
    File,
    Symlink,
    Directory,
    /// Hard links, devices, fifos and other kinds copied through verbatim.
    Other,
}

impl EntryKind {
    #[inline]
    const fn as_char(self) -> char {
        match self {
            Self::File => '-',
            Self::Symlink => 'l',
            Self::Directory => 'd',
            Self::Other => '?',
        }
    }
}

/// Listing view of a single archive entry.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EntryInfo {
    /// Entry name exactly as stored, lossily decoded when not UTF-8.
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    pub link_target: Option<String>,
    pub mode: Option<u32>,
    pub modified: Option<DateTime<Utc>>,
}

impl EntryInfo {
    #[inline]
    pub(crate) fn new(name: impl Into<String>, kind: EntryKind, size: u64) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
            link_target: None,
            mode: None,
            modified: None,
        }
    }
}

/// Renders one `ls -l` style line: permissions, size, timestamp, name and link target.
impl Display for EntryInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.as_char())?;
        match self.mode {
            Some(mode) => f.write_str(&permission_string(mode))?,
            None => f.write_str("?????????")?,
        }
        write!(f, " {:>10} ", self.size)?;
        match self.modified {
            Some(modified) => write!(
                f,
                "{}",
                modified.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            )?,
            None => f.write_str("                   ")?,
        }
        write!(f, " {}", self.name)?;
        if let Some(target) = &self.link_target {
            write!(f, " -> {target}")?;
        }
        Ok(())
    }
}

fn permission_string(mode: u32) -> String {
    const BITS: [(u32, char); 9] = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    BITS.iter()
        .map(|&(bit, c)| if mode & bit != 0 { c } else { '-' })
        .collect()
}
