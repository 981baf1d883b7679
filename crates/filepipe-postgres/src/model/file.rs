//! File model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::files;

/// A file belonging to a record.
///
/// Created the first time a workflow submission references it and never
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// Record the file belongs to.
    pub record_id: String,
    /// Key of the file inside the record.
    pub file_key: String,
    /// Mimetype reported when the file was first seen.
    pub mimetype: String,
    /// Timestamp when the row was created.
    pub created_at: Timestamp,
}

/// Data for creating a new file.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFile {
    /// Record the file belongs to.
    pub record_id: String,
    /// Key of the file inside the record.
    pub file_key: String,
    /// Mimetype of the file.
    pub mimetype: String,
}
