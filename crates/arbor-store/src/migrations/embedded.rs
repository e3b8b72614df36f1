//! Migrations embedded at compile time

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// All migrations in application order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_initial_schema",
            sql: include_str!("../../migrations/001_initial_schema.sql"),
        },
        Migration {
            id: "002_organization",
            sql: include_str!("../../migrations/002_organization.sql"),
        },
    ]
}
