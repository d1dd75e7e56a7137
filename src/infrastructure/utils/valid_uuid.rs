use uuid::Uuid;

/// Parses a session id, accepting only version 4 UUIDs.
pub fn valid_uuid(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id)
        .ok()
        .filter(|uuid| uuid.get_version_num() == 4)
}
