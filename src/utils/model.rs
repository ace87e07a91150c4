use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoginRequests {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct PostIdQuery {
    #[serde(rename = "postId")]
    pub post_id: Option<String>,
}
