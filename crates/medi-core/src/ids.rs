//! ID prefix constants.
//!
//! Every persisted entity carries an ID of the form `<prefix>-<8 hex chars>`,
//! e.g. `ses-a3f8b2c1`. IDs are minted by `medi-db` using `randomblob(4)`.

pub const PREFIX_SESSION: &str = "ses";
pub const PREFIX_QUERY: &str = "qry";
pub const PREFIX_APPROVAL: &str = "apr";
pub const PREFIX_MEMORY: &str = "mem";
pub const PREFIX_AUDIT: &str = "aud";

/// All prefixes, for exhaustive tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_SESSION,
    PREFIX_QUERY,
    PREFIX_APPROVAL,
    PREFIX_MEMORY,
    PREFIX_AUDIT,
];
