/// Reject an update that names no field to change. `fields` pairs each flag
/// with whether it was given.
pub fn require_any_field(fields: &[(&str, bool)]) -> anyhow::Result<()> {
    if fields.iter().any(|(_, given)| *given) {
        return Ok(());
    }
    let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
    let listed = match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {last}", rest.join(", ")),
        Some((only, _)) => (*only).to_string(),
        None => String::from("a field"),
    };
    anyhow::bail!("At least one of {listed} must be provided")
}

#[cfg(test)]
mod tests {
    use super::require_any_field;

    #[test]
    fn rejects_empty_update_naming_every_flag() {
        let err = require_any_field(&[("--company", false), ("--value", false), ("--notes", false)])
            .expect_err("should fail");
        assert_eq!(
            err.to_string(),
            "At least one of --company, --value, or --notes must be provided"
        );
    }

    #[test]
    fn accepts_single_field() {
        assert!(require_any_field(&[("--name", false), ("--budget", true)]).is_ok());
    }
}
