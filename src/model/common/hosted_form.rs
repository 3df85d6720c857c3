use serde::{Deserialize, Serialize};

/// Where an application form lives on the form host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedForm {
    pub form_id: String,
    pub edit_url: String,
    pub embed_code: String,
    pub preview_url: String,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl HostedForm {
        pub fn example() -> Self {
            Self {
                form_id: "wA1bC2".to_string(),
                edit_url: "https://tally.so/forms/wA1bC2/edit".to_string(),
                embed_code: r#"<iframe src="https://tally.so/embed/wA1bC2"></iframe>"#.to_string(),
                preview_url: "https://tally.so/r/wA1bC2".to_string(),
            }
        }
    }
}
