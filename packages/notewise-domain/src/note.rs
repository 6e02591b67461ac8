use time::OffsetDateTime;

/// A stored note owned by exactly one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
	pub id: String,
	pub user_id: String,
	pub transcript: String,
	/// Generated notes text.
	pub notes: String,
	pub created_at: OffsetDateTime,
	/// Display timestamp, moved by manual edits.
	pub timestamp: OffsetDateTime,
}
impl Note {
	/// Text matched against a query: the generated notes, a newline, then the transcript.
	pub fn searchable_text(&self) -> String {
		let mut text = String::with_capacity(self.notes.len() + 1 + self.transcript.len());

		text.push_str(&self.notes);
		text.push('\n');
		text.push_str(&self.transcript);

		text
	}
}
