use rust_embed::RustEmbed;

/// Embedded database migrations
#[derive(RustEmbed)]
#[folder = "src/database/migrations/"]
#[prefix = "migrations/"]
pub struct MigrationAssets;

/// A migration script paired with the version parsed from its file name
#[derive(Debug, Clone)]
pub struct EmbeddedMigration {
    pub version: i64,
    pub name: String,
    pub sql: String,
}

impl MigrationAssets {
    /// All embedded migrations ordered by version.
    ///
    /// Files must be named `<version>_<description>.sql`; anything else is skipped.
    pub fn ordered() -> Vec<EmbeddedMigration> {
        let mut migrations: Vec<EmbeddedMigration> = Self::iter()
            .filter_map(|path| {
                let file = Self::get(&path)?;
                let name = path.strip_prefix("migrations/").unwrap_or(&path).to_string();
                let version = name.split('_').next()?.parse().ok()?;
                Some(EmbeddedMigration {
                    version,
                    name,
                    sql: String::from_utf8_lossy(&file.data).into_owned(),
                })
            })
            .collect();

        migrations.sort_by_key(|m| m.version);
        migrations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_schema_is_embedded_first() {
        let migrations = MigrationAssets::ordered();
        let first = migrations.first().expect("at least one migration");

        assert_eq!(first.version, 1);
        assert_eq!(first.name, "001_initial_schema.sql");
        assert!(first.sql.contains("CREATE TABLE IF NOT EXISTS radio_programs"));
    }
}
