use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{ForumComment, ForumPost, NewForumComment, NewForumPost, Profile, Subject};
use crate::store::{names_by_id, Store};

pub const RECENT_POSTS: i64 = 20;

#[derive(Debug, Clone)]
pub struct PostListing {
    pub post: ForumPost,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CommentListing {
    pub comment: ForumComment,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Thread {
    pub post: PostListing,
    pub comments: Vec<CommentListing>,
}

pub async fn create_post(
    store: &dyn Store,
    author: &Profile,
    subject: Option<Subject>,
    title: &str,
    content: &str,
) -> AppResult<ForumPost> {
    let (title, content) = (title.trim(), content.trim());
    if title.is_empty() {
        return Err(AppError::validation("post title is required"));
    }
    if content.is_empty() {
        return Err(AppError::validation("post content is required"));
    }

    let post = store
        .insert_post(&NewForumPost {
            author_id: author.id,
            subject,
            title: title.to_string(),
            content: content.to_string(),
        })
        .await?;

    info!(post_id = %post.id, author_id = %author.id, "forum post created");
    Ok(post)
}

pub async fn recent_posts(store: &dyn Store) -> AppResult<Vec<PostListing>> {
    let posts = store.list_posts(Some(RECENT_POSTS)).await?;
    let names = names_by_id(store, posts.iter().map(|p| p.author_id)).await?;

    Ok(posts
        .into_iter()
        .map(|post| PostListing {
            author_name: names.get(&post.author_id).cloned(),
            post,
        })
        .collect())
}

pub async fn add_comment(
    store: &dyn Store,
    author: &Profile,
    post_id: Uuid,
    content: &str,
) -> AppResult<ForumComment> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::validation("comment content is required"));
    }
    if store.fetch_post(post_id).await?.is_none() {
        return Err(AppError::not_found("forum post", post_id));
    }

    let comment = store
        .insert_comment(&NewForumComment {
            post_id,
            author_id: author.id,
            content: content.to_string(),
        })
        .await?;

    info!(%post_id, comment_id = %comment.id, author_id = %author.id, "forum comment added");
    Ok(comment)
}

pub async fn thread(store: &dyn Store, post_id: Uuid) -> AppResult<Thread> {
    let post = store
        .fetch_post(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("forum post", post_id))?;
    let comments = store.list_comments(post_id).await?;

    let authors = std::iter::once(post.author_id).chain(comments.iter().map(|c| c.author_id));
    let names = names_by_id(store, authors).await?;

    Ok(Thread {
        post: PostListing {
            author_name: names.get(&post.author_id).cloned(),
            post,
        },
        comments: comments
            .into_iter()
            .map(|comment| CommentListing {
                author_name: names.get(&comment.author_id).cloned(),
                comment,
            })
            .collect(),
    })
}
