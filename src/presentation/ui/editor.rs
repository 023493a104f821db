use askama::Template;

use crate::application::controls::DeleteDialogPhase;
use crate::config::CopySettings;
use crate::domain::entities::PostRecord;

use super::layout::LayoutView;

/// Delete menu plus its confirmation dialog and "please wait" modal.
#[derive(Clone)]
pub struct DeleteDialogView {
    pub post_id: String,
    pub phase: &'static str,
    pub confirm_visible: bool,
    pub wait_visible: bool,
    pub open_url: String,
    pub cancel_url: String,
    pub confirm_url: String,
    pub delete_label: String,
    pub confirm_title: String,
    pub confirm_body: String,
    pub cancel_label: String,
    pub please_wait: String,
}

impl DeleteDialogView {
    pub fn new(post_id: &str, phase: DeleteDialogPhase, copy: &CopySettings) -> Self {
        Self {
            post_id: post_id.to_string(),
            phase: phase.as_str(),
            confirm_visible: phase.confirm_visible(),
            wait_visible: phase.wait_visible(),
            open_url: format!("/posts/{post_id}/delete/open"),
            cancel_url: format!("/posts/{post_id}/delete/cancel"),
            confirm_url: format!("/posts/{post_id}/delete"),
            delete_label: copy.delete_post.clone(),
            confirm_title: copy.delete_confirm_title.clone(),
            confirm_body: copy.delete_confirm_body.clone(),
            cancel_label: copy.cancel.clone(),
            please_wait: copy.please_wait.clone(),
        }
    }
}

#[derive(Clone)]
pub struct PostEditorView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub publish_url: String,
    /// Value the publish control submits: the opposite of the current state.
    pub publish_target: &'static str,
    pub publish_label: String,
    pub delete: DeleteDialogView,
}

impl PostEditorView {
    pub fn from_record(post: &PostRecord, copy: &CopySettings) -> Self {
        let id = post.id.to_string();
        let (publish_target, publish_label) = if post.published {
            ("false", copy.unpublish_post.clone())
        } else {
            ("true", copy.publish_post.clone())
        };

        Self {
            publish_url: format!("/posts/{id}/publish"),
            delete: DeleteDialogView::new(&id, DeleteDialogPhase::Closed, copy),
            id,
            title: post.title.clone(),
            content: post.content.clone(),
            published: post.published,
            publish_target,
            publish_label,
        }
    }
}

#[derive(Template)]
#[template(path = "ui/editor.html")]
pub struct PostEditorPageTemplate {
    pub layout: LayoutView,
    pub editor: PostEditorView,
}

#[derive(Template)]
#[template(path = "ui/editor_panel.html")]
pub struct PostEditorPanelTemplate {
    pub editor: PostEditorView,
}

#[derive(Template)]
#[template(path = "ui/delete_dialog.html")]
pub struct DeleteDialogTemplate {
    pub dialog: DeleteDialogView,
}
