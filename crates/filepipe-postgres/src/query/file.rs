//! Files repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{File, NewFile};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for file rows.
///
/// Files are created at most once per `(record_id, file_key)` and never
/// updated, so there is no update or delete operation.
pub trait FileRepository {
    /// Finds the file with the given key inside a record.
    fn find_file_by_record_and_key(
        &mut self,
        record_id: &str,
        file_key: &str,
    ) -> impl Future<Output = PgResult<Option<File>>> + Send;

    /// Creates a new file row.
    ///
    /// Fails with a `files_record_key_unique` violation if the key already
    /// exists for the record.
    fn create_file(&mut self, new_file: NewFile) -> impl Future<Output = PgResult<File>> + Send;

    /// Returns the existing file for `(record_id, file_key)` or creates it.
    fn find_or_create_file(
        &mut self,
        new_file: NewFile,
    ) -> impl Future<Output = PgResult<File>> + Send;

    /// Lists all files of a record ordered by key.
    fn list_record_files(
        &mut self,
        record_id: &str,
    ) -> impl Future<Output = PgResult<Vec<File>>> + Send;
}

impl FileRepository for PgConnection {
    async fn find_file_by_record_and_key(
        &mut self,
        record_id: &str,
        file_key: &str,
    ) -> PgResult<Option<File>> {
        use schema::files::{self, dsl};

        let file = files::table
            .filter(dsl::record_id.eq(record_id))
            .filter(dsl::file_key.eq(file_key))
            .select(File::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(file)
    }

    async fn create_file(&mut self, new_file: NewFile) -> PgResult<File> {
        use schema::files;

        let file = diesel::insert_into(files::table)
            .values(&new_file)
            .returning(File::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(file)
    }

    async fn find_or_create_file(&mut self, new_file: NewFile) -> PgResult<File> {
        let existing = self
            .find_file_by_record_and_key(&new_file.record_id, &new_file.file_key)
            .await?;

        match existing {
            Some(file) => Ok(file),
            None => self.create_file(new_file).await,
        }
    }

    async fn list_record_files(&mut self, record_id: &str) -> PgResult<Vec<File>> {
        use schema::files::{self, dsl};

        let files = files::table
            .filter(dsl::record_id.eq(record_id))
            .order(dsl::file_key.asc())
            .select(File::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(files)
    }
}
