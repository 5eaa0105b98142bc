use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Engines the workbench can talk to. The variant decides the wire scheme
/// used when a connection URL is assembled and which reflection SQL the
/// catalog runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    Mssql,
    Mysql,
    Postgres,
    Sqlite,
}

impl SqlDialect {
    /// URL scheme for this engine. Dialect selection is a pure mapping; no
    /// driver is touched here.
    pub fn scheme(&self) -> &'static str {
        match self {
            SqlDialect::Mssql => "mssql",
            SqlDialect::Mysql => "mysql",
            SqlDialect::Postgres => "postgres",
            SqlDialect::Sqlite => "sqlite",
        }
    }
}

impl Display for SqlDialect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Everything needed to open a connection to one registered datasource.
///
/// Immutable after creation. The password is held encrypted and is only
/// decrypted transiently by the keyring collaborator when a connection URL
/// is built; plaintext never appears in serialized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub dialect: SqlDialect,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub encrypted_password: Vec<u8>,
    pub database: String,
}

impl ConnectionSpec {
    pub fn new(
        dialect: SqlDialect,
        host: &str,
        port: u16,
        username: &str,
        encrypted_password: Vec<u8>,
        database: &str,
    ) -> Self {
        Self {
            dialect,
            host: host.to_string(),
            port,
            username: username.to_string(),
            encrypted_password,
            database: database.to_string(),
        }
    }
}
