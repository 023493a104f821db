//! Request schemas for the post actions.
//!
//! Each `*Input` is the loosely-typed shape a caller hands in (JSON body, form
//! fields, or a payload assembled by a UI control). `parse` normalises it into
//! the typed value the action layer works with, or reports every offending
//! field at once. Parsing never touches the store.

use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::domain::error::{DomainError, FieldIssue};
use crate::domain::types::{PostId, UserId};

pub const TITLE_MAX_CHARS: usize = 200;
pub const CONTENT_MAX_CHARS: usize = 50_000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PublishPostInput {
    pub id: Option<String>,
    pub published: Option<bool>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeletePostInput {
    pub id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub published: bool,
    pub user_id: UserId,
}

/// Publication change for one post. `user_id`, when present, narrows the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPost {
    pub id: PostId,
    pub published: bool,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePost {
    pub id: PostId,
    pub user_id: UserId,
}

#[derive(Debug, Validate)]
struct PostTextRules {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    title: String,
    #[validate(length(max = 50000, message = "must be at most 50000 characters"))]
    content: String,
}

impl CreatePostInput {
    pub fn parse(self) -> Result<NewPost, DomainError> {
        let mut issues = Vec::new();

        let title = match self.title {
            Some(title) => title.trim().to_string(),
            None => {
                issues.push(required("title"));
                String::new()
            }
        };

        let content = self
            .content
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if !issues.iter().any(|issue| issue.field == "title") {
            let rules = PostTextRules {
                title: title.clone(),
                content: content.clone(),
            };
            if let Err(errors) = rules.validate() {
                collect_rule_issues(&errors, &["title", "content"], &mut issues);
            }
        } else if content.chars().count() > CONTENT_MAX_CHARS {
            issues.push(FieldIssue {
                field: "content",
                message: format!("must be at most {CONTENT_MAX_CHARS} characters"),
            });
        }

        for (field, value) in [("title", &title), ("content", &content)] {
            if value.contains('\0') && !issues.iter().any(|issue| issue.field == field) {
                issues.push(FieldIssue {
                    field,
                    message: "must not contain NUL characters".to_string(),
                });
            }
        }

        let user_id = parse_required(self.user_id.as_deref(), "user_id", UserId::parse, &mut issues);

        match (issues.is_empty(), user_id) {
            (true, Some(user_id)) => Ok(NewPost {
                title,
                content,
                published: self.published.unwrap_or(false),
                user_id,
            }),
            _ => Err(DomainError::Validation(issues)),
        }
    }
}

impl PublishPostInput {
    pub fn parse(self) -> Result<PublishPost, DomainError> {
        let mut issues = Vec::new();

        let id = parse_required(self.id.as_deref(), "id", PostId::parse, &mut issues);

        let published = self.published;
        if published.is_none() {
            issues.push(required("published"));
        }

        let user_id = match self.user_id.as_deref() {
            Some(raw) => match UserId::parse(raw) {
                Ok(user_id) => Some(user_id),
                Err(err) => {
                    absorb(err, &mut issues);
                    None
                }
            },
            None => None,
        };

        match (issues.is_empty(), id, published) {
            (true, Some(id), Some(published)) => Ok(PublishPost {
                id,
                published,
                user_id,
            }),
            _ => Err(DomainError::Validation(issues)),
        }
    }
}

impl DeletePostInput {
    pub fn parse(self) -> Result<DeletePost, DomainError> {
        let mut issues = Vec::new();

        let id = parse_required(self.id.as_deref(), "id", PostId::parse, &mut issues);
        let user_id = parse_required(self.user_id.as_deref(), "user_id", UserId::parse, &mut issues);

        match (id, user_id) {
            (Some(id), Some(user_id)) if issues.is_empty() => Ok(DeletePost { id, user_id }),
            _ => Err(DomainError::Validation(issues)),
        }
    }
}

fn required(field: &'static str) -> FieldIssue {
    FieldIssue {
        field,
        message: "is required".to_string(),
    }
}

fn parse_required<T>(
    raw: Option<&str>,
    field: &'static str,
    parse: fn(&str) -> Result<T, DomainError>,
    issues: &mut Vec<FieldIssue>,
) -> Option<T> {
    let Some(raw) = raw else {
        issues.push(required(field));
        return None;
    };

    match parse(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            absorb(err, issues);
            None
        }
    }
}

fn absorb(err: DomainError, issues: &mut Vec<FieldIssue>) {
    let DomainError::Validation(found) = err;
    issues.extend(found);
}

fn collect_rule_issues(
    errors: &ValidationErrors,
    fields: &[&'static str],
    issues: &mut Vec<FieldIssue>,
) {
    let by_field = errors.field_errors();
    for field in fields {
        let Some(found) = by_field.get(*field) else {
            continue;
        };
        for error in found.iter() {
            let message = error
                .message
                .as_ref()
                .map(|message| message.to_string())
                .unwrap_or_else(|| error.code.to_string());
            issues.push(FieldIssue {
                field: *field,
                message,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_input(title: Option<&str>, content: Option<&str>) -> CreatePostInput {
        CreatePostInput {
            title: title.map(str::to_string),
            content: content.map(str::to_string),
            published: Some(false),
            user_id: Some("u1".to_string()),
        }
    }

    #[test]
    fn missing_content_defaults_to_empty() {
        let post = create_input(Some("Hello"), None).parse().expect("valid");
        assert_eq!(post.title, "Hello");
        assert_eq!(post.content, "");
        assert!(!post.published);
        assert_eq!(post.user_id.as_str(), "u1");
    }

    #[test]
    fn title_is_trimmed() {
        let post = create_input(Some("  Spaced out  "), Some("body"))
            .parse()
            .expect("valid");
        assert_eq!(post.title, "Spaced out");
        assert_eq!(post.content, "body");
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = create_input(Some("   "), None).parse().expect_err("blank");
        assert_eq!(err.fields(), vec!["title"]);
    }

    #[test]
    fn oversized_title_is_rejected() {
        let long = "a".repeat(TITLE_MAX_CHARS + 1);
        let err = create_input(Some(&long), None).parse().expect_err("too long");
        assert_eq!(err.fields(), vec!["title"]);
    }

    #[test]
    fn nul_characters_are_rejected() {
        let err = create_input(Some("bad\0title"), Some("bad\0body"))
            .parse()
            .expect_err("nul bytes");
        assert_eq!(err.fields(), vec!["title", "content"]);
    }

    #[test]
    fn every_missing_create_field_is_reported() {
        let err = CreatePostInput::default().parse().expect_err("empty input");
        assert_eq!(err.fields(), vec!["title", "user_id"]);
    }

    #[test]
    fn published_defaults_to_false() {
        let input = CreatePostInput {
            published: None,
            ..create_input(Some("Draft"), None)
        };
        assert!(!input.parse().expect("valid").published);
    }

    #[test]
    fn publish_requires_flag_and_id() {
        let err = PublishPostInput::default().parse().expect_err("empty");
        assert_eq!(err.fields(), vec!["id", "published"]);
    }

    #[test]
    fn publish_accepts_missing_user() {
        let publish = PublishPostInput {
            id: Some("p1".into()),
            published: Some(true),
            user_id: None,
        }
        .parse()
        .expect("valid");
        assert_eq!(publish.id.as_str(), "p1");
        assert!(publish.published);
        assert!(publish.user_id.is_none());
    }

    #[test]
    fn publish_ignores_extra_fields_in_json() {
        let input: PublishPostInput = serde_json::from_str(
            r#"{"id":"p1","title":"T","content":"C","published":true,"user_id":"u1"}"#,
        )
        .expect("json");
        let publish = input.parse().expect("valid");
        assert_eq!(publish.user_id.map(UserId::into_inner).as_deref(), Some("u1"));
    }

    #[test]
    fn delete_requires_both_ids() {
        let err = DeletePostInput {
            id: Some("p1".into()),
            user_id: None,
        }
        .parse()
        .expect_err("missing user");
        assert_eq!(err.fields(), vec!["user_id"]);

        let err = DeletePostInput {
            id: Some(" ".into()),
            user_id: Some("u1".into()),
        }
        .parse()
        .expect_err("blank id");
        assert_eq!(err.fields(), vec!["id"]);
    }
}
