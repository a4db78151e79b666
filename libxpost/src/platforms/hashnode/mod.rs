//! Hashnode platform implementation
//!
//! Hashnode exposes a single GraphQL endpoint. Errors arrive either as HTTP
//! statuses or as `errors[].extensions.code` in a 200 response; both end up
//! in the shared error taxonomy.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{HashnodeCredentials, HttpConfig};
use crate::error::{ErrorCode, PlatformError, Result};
use crate::platforms::http::{build_client, map_transport_error, read_json};
use crate::platforms::{ensure_valid, Platform, Transformer};
use crate::retry::RetryPolicy;
use crate::types::{ListOptions, PlatformPost, Post};

pub mod wire;

use self::wire::{HashnodeContext, HashnodePost, HashnodeTransformer};

pub const HASHNODE_KEY: &str = "hashnode";
pub const HASHNODE_NAME: &str = "Hashnode";

pub const MAX_TITLE_LENGTH: usize = 250;
pub const MAX_TAGS: usize = 5;
pub const MAX_TAG_LENGTH: usize = 50;

/// Hashnode caps `first` at 50
const MAX_PAGE_WINDOW: u32 = 50;

const POST_FIELDS: &str = "id title subtitle brief url canonicalUrl publishedAt updatedAt \
     views reactionCount responseCount content { markdown } tags { name slug } coverImage { url }";

const DRAFT_FIELDS: &str =
    "id title subtitle canonicalUrl updatedAt content { markdown } tags { name slug } coverImage { url }";

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    extensions: Option<GraphQlExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphQlExtensions {
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MeData {
    me: Option<Me>,
}

#[derive(Debug, Deserialize)]
struct Me {
    id: String,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostPayload {
    post: Option<HashnodePost>,
}

#[derive(Debug, Deserialize)]
struct DraftPayload {
    draft: Option<HashnodePost>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishPostData {
    publish_post: PostPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDraftData {
    create_draft: DraftPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePostData {
    update_post: PostPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemovePostData {
    remove_post: PostPayload,
}

#[derive(Debug, Deserialize)]
struct PostData {
    post: Option<HashnodePost>,
}

#[derive(Debug, Deserialize)]
struct PublicationData {
    publication: Option<Publication>,
}

#[derive(Debug, Deserialize)]
struct Publication {
    posts: PostConnection,
}

#[derive(Debug, Deserialize)]
struct PostConnection {
    edges: Vec<PostEdge>,
}

#[derive(Debug, Deserialize)]
struct PostEdge {
    node: HashnodePost,
}

/// Map GraphQL `errors[]` to a platform error, using the first entry's code
fn map_graphql_errors(context: &str, errors: &[GraphQlError]) -> PlatformError {
    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    let code = errors
        .first()
        .and_then(|e| e.extensions.as_ref())
        .and_then(|x| x.code.as_deref())
        .unwrap_or("");

    match code {
        "UNAUTHENTICATED" | "FORBIDDEN" => PlatformError::Authentication(format!(
            "Hashnode rejected the token during {}: {}. Check your personal access token.",
            context, message
        )),
        "BAD_USER_INPUT" | "GRAPHQL_VALIDATION_FAILED" => PlatformError::Validation(format!(
            "Hashnode rejected the request during {}: {}",
            context, message
        )),
        "NOT_FOUND" => PlatformError::remote(
            ErrorCode::NotFound,
            format!("Hashnode resource not found during {}: {}", context, message),
        ),
        "TOO_MANY_REQUESTS" => PlatformError::rate_limited(
            format!("Hashnode rate limit exceeded during {}: {}", context, message),
            None,
        ),
        "INTERNAL_SERVER_ERROR" => PlatformError::remote(
            ErrorCode::ServerError,
            format!("Hashnode server error during {}: {}", context, message),
        ),
        _ => PlatformError::remote(
            ErrorCode::Unknown,
            format!("Hashnode operation failed during {}: {}", context, message),
        ),
    }
}

fn missing(context: &str, what: &str) -> PlatformError {
    PlatformError::remote(
        ErrorCode::Unknown,
        format!("Hashnode returned no {} during {}", what, context),
    )
}

pub struct HashnodeClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    context: HashnodeContext,
    retry: RetryPolicy,
    transformer: HashnodeTransformer,
}

impl HashnodeClient {
    /// Create a new Hashnode client
    ///
    /// # Arguments
    ///
    /// * `credentials` - Personal access token, publication id and endpoint
    /// * `http` - Timeout and user agent for the owned HTTP client
    /// * `retry` - Retry policy applied to every post operation
    pub fn new(
        credentials: &HashnodeCredentials,
        http: &HttpConfig,
        retry: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self {
            http: build_client(http)?,
            endpoint: credentials.endpoint.clone(),
            token: credentials.token.clone(),
            context: HashnodeContext {
                publication_id: credentials.publication_id.clone(),
            },
            retry,
            transformer: HashnodeTransformer,
        })
    }

    /// Run one GraphQL document and return its `data`
    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: &Value,
        context: &str,
    ) -> Result<T> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| map_transport_error(HASHNODE_NAME, context, e))?;

        let body: GraphQlResponse<T> = read_json(HASHNODE_NAME, context, response).await?;
        if !body.errors.is_empty() {
            return Err(map_graphql_errors(context, &body.errors).into());
        }
        body.data.ok_or_else(|| missing(context, "data").into())
    }

    /// `graphql` wrapped in the retry policy
    async fn graphql_with_retry<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: &Value,
        context: &str,
    ) -> Result<T> {
        self.retry
            .execute(context, || self.graphql::<T>(query, variables, context))
            .await
    }
}

#[async_trait]
impl Platform for HashnodeClient {
    fn key(&self) -> &str {
        HASHNODE_KEY
    }

    fn name(&self) -> &str {
        HASHNODE_NAME
    }

    async fn authenticate(&self) -> Result<bool> {
        let data: MeData = self
            .graphql("query Me { me { id username } }", &json!({}), "authenticate")
            .await?;

        match data.me {
            Some(me) => {
                tracing::debug!(
                    "Authenticated with Hashnode as {} ({})",
                    me.username.as_deref().unwrap_or("unknown"),
                    me.id
                );
                Ok(true)
            }
            None => Err(PlatformError::Authentication(
                "Hashnode did not recognise the token".to_string(),
            )
            .into()),
        }
    }

    fn validate(&self, post: &Post) -> Vec<String> {
        self.transformer.validate(post)
    }

    async fn create_post(&self, post: &Post) -> Result<PlatformPost> {
        ensure_valid(HASHNODE_NAME, self.validate(post))?;
        let input = self.transformer.to_wire(post, &self.context);
        let variables = json!({ "input": input });

        let remote = if post.publish_status.is_published() {
            let query = format!(
                "mutation PublishPost($input: PublishPostInput!) {{ publishPost(input: $input) {{ post {{ {} }} }} }}",
                POST_FIELDS
            );
            let data: PublishPostData = self
                .graphql_with_retry(&query, &variables, "publish post")
                .await?;
            data.publish_post
                .post
                .ok_or_else(|| missing("publish post", "post"))?
        } else {
            let query = format!(
                "mutation CreateDraft($input: CreateDraftInput!) {{ createDraft(input: $input) {{ draft {{ {} }} }} }}",
                DRAFT_FIELDS
            );
            let data: CreateDraftData = self
                .graphql_with_retry(&query, &variables, "create draft")
                .await?;
            data.create_draft
                .draft
                .ok_or_else(|| missing("create draft", "draft"))?
        };

        Ok(self.transformer.from_wire(remote))
    }

    async fn update_post(&self, platform_id: &str, post: &Post) -> Result<PlatformPost> {
        ensure_valid(HASHNODE_NAME, self.validate(post))?;
        let mut input = self.transformer.to_wire(post, &self.context);
        input.id = Some(platform_id.to_string());
        let variables = json!({ "input": input });

        let query = format!(
            "mutation UpdatePost($input: UpdatePostInput!) {{ updatePost(input: $input) {{ post {{ {} }} }} }}",
            POST_FIELDS
        );
        let data: UpdatePostData = self
            .graphql_with_retry(&query, &variables, "update post")
            .await?;
        let remote = data
            .update_post
            .post
            .ok_or_else(|| missing("update post", "post"))?;

        Ok(self.transformer.from_wire(remote))
    }

    async fn delete_post(&self, platform_id: &str) -> Result<bool> {
        let variables = json!({ "input": { "id": platform_id } });
        let data: RemovePostData = self
            .graphql_with_retry(
                "mutation RemovePost($input: RemovePostInput!) { removePost(input: $input) { post { id } } }",
                &variables,
                "remove post",
            )
            .await?;

        data.remove_post.post.ok_or_else(|| {
            PlatformError::remote(
                ErrorCode::NotFound,
                format!("Hashnode post {} was not removed", platform_id),
            )
        })?;
        Ok(true)
    }

    async fn get_post(&self, platform_id: &str) -> Result<PlatformPost> {
        let query = format!("query Post($id: ID!) {{ post(id: $id) {{ {} }} }}", POST_FIELDS);
        let variables = json!({ "id": platform_id });
        let data: PostData = self
            .graphql_with_retry(&query, &variables, "get post")
            .await?;

        let remote = data.post.ok_or_else(|| {
            PlatformError::remote(
                ErrorCode::NotFound,
                format!("Hashnode post {} not found", platform_id),
            )
        })?;
        Ok(self.transformer.from_wire(remote))
    }

    async fn list_posts(&self, options: &ListOptions) -> Result<Vec<PlatformPost>> {
        // Cursor paging is flattened into a single window, so deep pages are capped
        let per_page = options.per_page.clamp(1, MAX_PAGE_WINDOW);
        let page = u64::from(options.page.max(1));
        let skip = (page - 1) * u64::from(per_page);
        if skip >= u64::from(MAX_PAGE_WINDOW) {
            return Ok(Vec::new());
        }
        let first = (page * u64::from(per_page)).min(u64::from(MAX_PAGE_WINDOW));

        let query = format!(
            "query PublicationPosts($id: ObjectId!, $first: Int!) {{ publication(id: $id) {{ posts(first: $first) {{ edges {{ node {{ {} }} }} }} }} }}",
            POST_FIELDS
        );
        let variables = json!({ "id": self.context.publication_id, "first": first });
        let data: PublicationData = self
            .graphql_with_retry(&query, &variables, "list posts")
            .await?;

        let publication = data.publication.ok_or_else(|| {
            PlatformError::remote(
                ErrorCode::NotFound,
                format!("Hashnode publication {} not found", self.context.publication_id),
            )
        })?;

        Ok(publication
            .posts
            .edges
            .into_iter()
            .skip(skip as usize)
            .take(per_page as usize)
            .map(|edge| self.transformer.from_wire(edge.node))
            .collect())
    }
}
