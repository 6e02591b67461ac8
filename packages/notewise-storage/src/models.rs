use time::OffsetDateTime;

use notewise_domain::Note;

#[derive(Debug, sqlx::FromRow)]
pub struct NoteRow {
	pub id: String,
	pub user_id: String,
	pub transcript: String,
	pub notes: String,
	pub created_at: OffsetDateTime,
	pub timestamp: OffsetDateTime,
}
impl From<NoteRow> for Note {
	fn from(row: NoteRow) -> Self {
		Self {
			id: row.id,
			user_id: row.user_id,
			transcript: row.transcript,
			notes: row.notes,
			created_at: row.created_at,
			timestamp: row.timestamp,
		}
	}
}
