use askama::Template;
use time::format_description::well_known::Rfc3339;

use crate::config::CopySettings;
use crate::domain::entities::PostRecord;

use super::layout::LayoutView;

#[derive(Clone)]
pub struct PostRowView {
    pub id: String,
    pub title: String,
    pub href: String,
    pub published: bool,
    pub updated_at: String,
}

impl PostRowView {
    pub fn from_record(post: &PostRecord) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            href: format!("/posts/{}", post.id),
            published: post.published,
            updated_at: post.updated_at.format(&Rfc3339).unwrap_or_default(),
        }
    }
}

#[derive(Clone)]
pub struct PostsPanelView {
    pub rows: Vec<PostRowView>,
    pub signed_in: bool,
}

impl PostsPanelView {
    pub fn new(posts: &[PostRecord], signed_in: bool) -> Self {
        Self {
            rows: posts.iter().map(PostRowView::from_record).collect(),
            signed_in,
        }
    }
}

#[derive(Clone)]
pub struct CreateFormView {
    pub action: &'static str,
    pub submit_label: String,
    pub title_max: usize,
}

impl CreateFormView {
    pub fn new(copy: &CopySettings) -> Self {
        Self {
            action: "/posts/create",
            submit_label: copy.create_post.clone(),
            title_max: crate::domain::posts::TITLE_MAX_CHARS,
        }
    }
}

#[derive(Template)]
#[template(path = "ui/posts.html")]
pub struct PostsPageTemplate {
    pub layout: LayoutView,
    pub panel: PostsPanelView,
    pub form: CreateFormView,
}

#[derive(Template)]
#[template(path = "ui/posts_panel.html")]
pub struct PostsPanelTemplate {
    pub panel: PostsPanelView,
}

#[derive(Template)]
#[template(path = "ui/create_form.html")]
pub struct CreateFormTemplate {
    pub form: CreateFormView,
}
