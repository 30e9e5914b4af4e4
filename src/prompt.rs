use crate::types::BlogPayload;

pub fn blog_prompt(payload: &BlogPayload) -> String {
    format!(
        "Summarize the following blog post and list any potential improvements:\n\nTitle: {}\n\n{}",
        payload.title, payload.content
    )
}

pub fn docstring_prompt(kind: &str, source: &str) -> String {
    format!("Write a concise docstring for the following Python {kind}:\n\n{source}")
}

pub fn placeholder_doc(name: &str) -> String {
    format!("Documentation placeholder for declaration {name}.")
}
