use notewise_domain::Note;

use crate::{Error, Result, db::Db, models::NoteRow};

/// Notes owned by `user_id`, newest first.
pub async fn list_notes_for_user(db: &Db, user_id: &str) -> Result<Vec<Note>> {
	if user_id.trim().is_empty() {
		return Err(Error::InvalidArgument("user_id must be non-empty.".to_string()));
	}

	let rows: Vec<NoteRow> = sqlx::query_as(
		"\
SELECT
	id,
	user_id,
	transcript,
	notes,
	created_at,
	timestamp
FROM notes
WHERE user_id = $1
ORDER BY created_at DESC, id ASC",
	)
	.bind(user_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows.into_iter().map(Note::from).collect())
}
