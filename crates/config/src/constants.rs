/// Additional attempts after the first one when no retry policy is given.
pub const DEFAULT_RETRIES: u32 = 0;

/// Delay between attempts, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 10_000;

/// Regex separating the patterns of an include or exclude list.
pub const DEFAULT_PATTERN_SEPARATOR: &str = "[, ]+";

/// Characters that may not appear in a configuration name.
pub const ILLEGAL_NAME_CHARS: &str = "< & ' \" \\";

/// Environment variable holding the build number.
pub const ENV_BUILD_NUMBER: &str = "BUILD_NUMBER";

/// Environment variable holding the job name.
pub const ENV_JOB_NAME: &str = "JOB_NAME";

/// Exclude patterns applied unless a transfer disables them.
///
/// Covers VCS metadata (CVS, SCCS, Subversion, Git, Mercurial, Bazaar),
/// editor backups and macOS finder litter.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    "**/CVS",
    "**/CVS/**",
    "**/.cvsignore",
    "**/SCCS",
    "**/SCCS/**",
    "**/vssver.scc",
    "**/.svn",
    "**/.svn/**",
    "**/.DS_Store",
    "**/.git",
    "**/.git/**",
    "**/.gitattributes",
    "**/.gitignore",
    "**/.gitmodules",
    "**/.hg",
    "**/.hg/**",
    "**/.hgignore",
    "**/.hgsub",
    "**/.hgsubstate",
    "**/.hgtags",
    "**/.bzr",
    "**/.bzr/**",
    "**/.bzrignore",
];
