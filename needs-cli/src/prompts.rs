use anyhow::Result;
use inquire::Text;

/// Fields of a need collected on the command line
#[derive(Debug, Default)]
pub struct NeedInput {
    pub id: Option<String>,
    pub title: Option<String>,
    pub need_type: Option<String>,
    pub type_name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub tags: Option<String>,
    pub links: Option<String>,
}

/// Prompts for every field that was not given on the command line
pub fn prompt_missing_fields(input: &mut NeedInput) -> Result<()> {
    if input.id.is_none() {
        input.id = Some(Text::new("Id:").prompt()?);
    }
    if input.title.is_none() {
        input.title = Some(Text::new("Title:").prompt()?);
    }
    if input.need_type.is_none() {
        input.need_type = Some(Text::new("Type:").with_default("req").prompt()?);
    }
    if input.type_name.is_none() {
        input.type_name = optional(Text::new("Type name (optional):").prompt()?);
    }
    if input.description.is_none() {
        input.description = optional(inquire::Editor::new("Description (optional):").prompt()?);
    }
    if input.status.is_none() {
        input.status = optional(Text::new("Status (optional):").prompt()?);
    }
    if input.tags.is_none() {
        input.tags = optional(Text::new("Tags (comma-separated, optional):").prompt()?);
    }
    if input.links.is_none() {
        input.links = optional(Text::new("Links (comma-separated ids, optional):").prompt()?);
    }
    Ok(())
}

fn optional(value: String) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
