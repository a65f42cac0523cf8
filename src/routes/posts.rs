use chrono::Utc;
use rocket::{delete, get, post, put, routes, serde::json::Json, Route};
use serde_json::json;

use crate::{
    database::deadline,
    models::content::feed::feed_window,
    middleware::*,
    quill_log,
    routes::{created, ok, JsonResult},
    services::PageRequest,
    structs::*,
};

pub const POSTS_DEFAULT_LIMIT: i64 = 10;
pub const COMMENTS_DEFAULT_LIMIT: i64 = 5;

#[post("/posts/<id>/comments", data = "<payload>")]
pub async fn create_comment(id: i32, user: AuthUser, payload: Json<CommentPayload>) -> JsonResult {
    let payload = payload.into_inner();
    let message = match payload.target(id) {
        CommentTarget::Reply(_) => "comment reply comment",
        CommentTarget::Post(_) => "comment post",
    };

    let comment = deadline(Comments::create(payload.into_new_comment(id, user.id, Utc::now().timestamp()))).await?;
    quill_log!(Info, format!("User {} created comment {} ({})", user.id, comment.id, message));

    Ok(created(json!({ "comment": comment, "message": message })))
}

#[get("/posts/feed?<limit>&<page>&<sort>")]
pub async fn get_feed(limit: Option<i64>, page: Option<i64>, sort: Option<&str>) -> JsonResult {
    let window = feed_window(page, limit, POSTS_DEFAULT_LIMIT);
    let all_posts = deadline(FeedPost::load(PostSort::from_query(sort), window)).await?;

    Ok(ok(json!({ "allPosts": all_posts })))
}

#[get("/posts/<id>/comments?<limit>&<page>")]
pub async fn get_comments_of_post(id: i32, limit: Option<i64>, page: Option<i64>) -> JsonResult {
    let page = PageRequest::from_query(page, limit, COMMENTS_DEFAULT_LIMIT);
    let comments = deadline(Comments::find_of_post(id, page)).await?;
    let total = deadline(Comments::total_of_post(id)).await?;
    let count = comments.len() as i64;

    Ok(ok(json!({
        "data": {
            "count": count,
            "comments": comments,
            "pagination": page.paginate(total, count),
        },
        "message": "get comments"
    })))
}

#[get("/posts/<id>/bookmarks")]
pub async fn get_bookmarks_of_post(id: i32) -> JsonResult {
    let bookmarks = deadline(Bookmarks::find_by_post(id)).await?;

    Ok(ok(json!({ "total": bookmarks.len(), "Bookmark": bookmarks })))
}

#[post("/posts/<id>/bookmarks")]
pub async fn toggle_bookmark(id: i32, user: AuthUser) -> JsonResult {
    deadline(Posts::get_by_id(id)).await?;
    let (bookmarked, total) = deadline(Bookmarks::toggle(id, user.id)).await?;

    Ok(ok(json!({ "bookmarked": bookmarked, "total": total })))
}

#[post("/posts/<id>/votes", data = "<request>")]
pub async fn vote_on_post(id: i32, user: AuthUser, request: Json<VoteRequest>) -> JsonResult {
    deadline(Posts::get_by_id(id)).await?;
    let (vote, votes) = deadline(Votes::cast(id, user.id, request.vote_type)).await?;

    Ok(ok(json!({ "vote": vote, "votes": votes })))
}

#[post("/posts/<id>/views")]
pub async fn record_view(id: i32) -> JsonResult {
    deadline(Posts::get_by_id(id)).await?;
    let views = deadline(PostViews::record(id)).await?;

    Ok(created(json!({ "views": views })))
}

#[put("/posts/<id>/tags", data = "<request>")]
pub async fn set_post_tags(id: i32, permitted: Permitted<Posts>, request: Json<SetPostTagsRequest>) -> JsonResult {
    let tags = deadline(Tags::replace_for_post(id, &request.tags)).await?;
    quill_log!(Info, format!("User {} set {} tag(s) on post {}", permitted.user.id, tags.len(), id));

    let tags: Vec<TagSummary> = tags.into_iter().map(TagSummary::from).collect();
    Ok(ok(json!({ "tags": tags })))
}

#[get("/posts?<limit>&<page>&<search>&<sort>")]
pub async fn get_all_posts(limit: Option<i64>, page: Option<i64>, search: Option<String>, sort: Option<&str>) -> JsonResult {
    let page = PageRequest::from_query(page, limit, POSTS_DEFAULT_LIMIT);
    let query = PostListQuery {
        skip: page.skip(),
        take: page.take(),
        search,
        sort: PostSort::from_query(sort),
    };

    let (posts, total) = deadline(Posts::list(&query)).await?;
    let count = posts.len() as i64;

    Ok(ok(json!({ "count": count, "posts": posts, "pagination": page.paginate(total, count) })))
}

#[get("/posts/<id>")]
pub async fn get_post_by_id(id: i32) -> JsonResult {
    let post = deadline(Posts::get_with_author(id)).await?;

    Ok(ok(json!({ "post": post, "message": "get post by id" })))
}

#[post("/posts", data = "<request>")]
pub async fn create_post(user: AuthUser, request: Json<CreatePostRequest>) -> JsonResult {
    let post = deadline(Posts::create(user.id, request.into_inner())).await?;
    quill_log!(Info, format!("User {} created post {}", user.id, post.post.id));

    Ok(created(json!({ "data": post, "message": "created" })))
}

#[put("/posts/<id>", data = "<request>")]
pub async fn update_post(id: i32, permitted: Permitted<Posts>, request: Json<UpdatePostRequest>) -> JsonResult {
    let post = deadline(Posts::update_by_id(id, request.into_inner())).await?;
    quill_log!(Info, format!("User {} updated post {}", permitted.user.id, id));

    Ok(ok(json!({ "data": post, "message": "updated" })))
}

#[delete("/posts/<id>")]
pub async fn delete_post(id: i32, permitted: Permitted<Posts>) -> JsonResult {
    deadline(Posts::delete_by_id(permitted.record.id)).await?;
    quill_log!(Info, format!("User {} deleted post {}", permitted.user.id, id));

    Ok(ok(json!({ "message": "deleted" })))
}

pub fn post_routes() -> Vec<Route> {
    routes![
        create_comment,
        get_feed,
        get_comments_of_post,
        get_bookmarks_of_post,
        toggle_bookmark,
        vote_on_post,
        record_view,
        set_post_tags,
        get_all_posts,
        get_post_by_id,
        create_post,
        update_post,
        delete_post,
    ]
}
