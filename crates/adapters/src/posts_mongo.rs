//! MongoDB post store implementation

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use gemm_domain::{NewPost, Post, PostStore, PostStoreError};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::error::ErrorKind;
use mongodb::options::{ClientOptions, Credential};
use mongodb::{Client, Collection};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Connection settings for the document store
#[derive(Debug, Clone)]
pub struct MongoSettings {
    /// Connection string, e.g. `mongodb+srv://cluster.example.net/?retryWrites=true&w=majority`
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub user: Option<String>,
    pub password: Option<SecretString>,
    /// Bounds both the TCP connect and server selection
    pub connect_timeout: Duration,
}

/// Shape of a post in the `posts` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PostDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default)]
    body: String,
    #[serde(default)]
    tags: Vec<String>,
    /// RFC 3339
    datetime: String,
}

impl PostDocument {
    fn from_new(post: &NewPost) -> Result<Self, PostStoreError> {
        let datetime = post
            .datetime
            .format(&Rfc3339)
            .map_err(|e| PostStoreError::Serialization(e.to_string()))?;

        Ok(Self {
            id: None,
            user_id: post.user_id.clone(),
            title: post.title.clone(),
            body: post.body.clone(),
            tags: post.tags.clone(),
            datetime,
        })
    }

    fn into_post(self) -> Result<Post, PostStoreError> {
        let id = self
            .id
            .ok_or_else(|| PostStoreError::Serialization("document without _id".to_string()))?;
        let datetime = OffsetDateTime::parse(&self.datetime, &Rfc3339)
            .map_err(|e| PostStoreError::Serialization(e.to_string()))?;

        Ok(Post {
            id: id.to_hex(),
            user_id: self.user_id,
            title: self.title,
            body: self.body,
            tags: self.tags,
            datetime,
        })
    }
}

fn map_mongo_error(e: mongodb::error::Error) -> PostStoreError {
    match *e.kind {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
            PostStoreError::Unavailable(e.to_string())
        }
        ErrorKind::BsonDeserialization(_) | ErrorKind::BsonSerialization(_) => {
            PostStoreError::Serialization(e.to_string())
        }
        _ => PostStoreError::Database(e.to_string()),
    }
}

/// Convert documents to posts, skipping any that cannot be read back
fn usable_posts(documents: Vec<PostDocument>) -> Vec<Post> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document.id.map(|oid| oid.to_hex());
            match document.into_post() {
                Ok(post) => Some(post),
                Err(e) => {
                    tracing::warn!(id = ?id, error = %e, "Skipping unreadable post document");
                    None
                }
            }
        })
        .collect()
}

/// MongoDB-backed post store sharing a single client
pub struct MongoPostStore {
    client: Client,
    database: String,
    posts: Collection<PostDocument>,
}

impl MongoPostStore {
    /// Build the client. No server is contacted until the first operation.
    pub async fn connect(settings: &MongoSettings) -> Result<Self, PostStoreError> {
        let mut options = ClientOptions::parse(&settings.uri)
            .await
            .map_err(map_mongo_error)?;

        options.app_name = Some("gemm".to_string());
        options.connect_timeout = Some(settings.connect_timeout);
        options.server_selection_timeout = Some(settings.connect_timeout);

        if let Some(user) = &settings.user {
            options.credential = Some(
                Credential::builder()
                    .username(user.clone())
                    .password(
                        settings
                            .password
                            .as_ref()
                            .map(|p| p.expose_secret().to_string()),
                    )
                    .build(),
            );
        }

        let client = Client::with_options(options).map_err(map_mongo_error)?;
        let posts = client
            .database(&settings.database)
            .collection::<PostDocument>(&settings.collection);

        tracing::debug!(
            database = %settings.database,
            collection = %settings.collection,
            "MongoDB client configured"
        );

        Ok(Self {
            client,
            database: settings.database.clone(),
            posts,
        })
    }

    /// Shut the client down, ending its background monitoring tasks
    pub async fn close(&self) {
        self.client.clone().shutdown().await;
    }

    async fn collect(&self, filter: mongodb::bson::Document) -> Result<Vec<Post>, PostStoreError> {
        let cursor = self
            .posts
            .find(filter)
            .sort(doc! { "_id": 1 })
            .await
            .map_err(map_mongo_error)?;

        let documents: Vec<PostDocument> = cursor.try_collect().await.map_err(map_mongo_error)?;
        Ok(usable_posts(documents))
    }
}

#[async_trait]
impl PostStore for MongoPostStore {
    async fn insert(&self, post: NewPost) -> Result<Post, PostStoreError> {
        let document = PostDocument::from_new(&post)?;
        let result = self
            .posts
            .insert_one(&document)
            .await
            .map_err(map_mongo_error)?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            PostStoreError::Database(format!(
                "unexpected inserted id: {}",
                result.inserted_id
            ))
        })?;

        Ok(Post::from_new(id.to_hex(), post))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, PostStoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            tracing::debug!(id = %id, "Not an ObjectId");
            return Ok(None);
        };

        self.posts
            .find_one(doc! { "_id": oid })
            .await
            .map_err(map_mongo_error)?
            .map(PostDocument::into_post)
            .transpose()
    }

    async fn find_by_author(&self, user_id: &str) -> Result<Vec<Post>, PostStoreError> {
        self.collect(doc! { "user_id": user_id }).await
    }

    async fn find_by_tags(&self, tags: &[String]) -> Result<Vec<Post>, PostStoreError> {
        self.collect(doc! { "tags": { "$in": tags.to_vec() } }).await
    }

    async fn ping(&self) -> Result<(), PostStoreError> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(map_mongo_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn new_post() -> NewPost {
        NewPost {
            user_id: "fred".to_string(),
            title: Some("Hello".to_string()),
            body: "#Foo #bar text".to_string(),
            tags: vec!["foo".to_string(), "bar".to_string()],
            datetime: datetime!(2024-01-15 12:00 UTC),
        }
    }

    #[test]
    fn test_document_round_trip_keeps_fields() {
        let mut document = PostDocument::from_new(&new_post()).unwrap();
        assert_eq!(document.datetime, "2024-01-15T12:00:00Z");

        let oid = ObjectId::new();
        document.id = Some(oid);
        let post = document.into_post().unwrap();

        assert_eq!(post.id, oid.to_hex());
        assert_eq!(post.tags, vec!["foo", "bar"]);
        assert_eq!(post.datetime, datetime!(2024-01-15 12:00 UTC));
    }

    #[test]
    fn test_new_document_has_no_id_field() {
        let document = PostDocument::from_new(&new_post()).unwrap();
        let bson = mongodb::bson::to_document(&document).unwrap();

        assert!(!bson.contains_key("_id"));
        assert_eq!(bson.get_str("user_id").unwrap(), "fred");
    }

    #[test]
    fn test_unreadable_documents_are_skipped() {
        let good = PostDocument {
            id: Some(ObjectId::new()),
            ..PostDocument::from_new(&new_post()).unwrap()
        };
        let bad_datetime = PostDocument {
            id: Some(ObjectId::new()),
            datetime: "Mon Jan 15 2024 20:00:00 GMT+0800".to_string(),
            ..PostDocument::from_new(&new_post()).unwrap()
        };
        let missing_id = PostDocument::from_new(&new_post()).unwrap();

        let posts = usable_posts(vec![bad_datetime, good.clone(), missing_id]);

        assert_eq!(posts.len(), 1);
        assert_eq!(Some(posts[0].id.clone()), good.id.map(|oid| oid.to_hex()));
    }

    #[test]
    fn test_document_without_id_is_rejected() {
        let document = PostDocument::from_new(&new_post()).unwrap();
        assert!(matches!(
            document.into_post(),
            Err(PostStoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_ping_unreachable_server_is_unavailable() {
        let store = MongoPostStore::connect(&MongoSettings {
            uri: "mongodb://127.0.0.1:1".to_string(),
            database: "gemm".to_string(),
            collection: "posts".to_string(),
            user: None,
            password: None,
            connect_timeout: Duration::from_millis(300),
        })
        .await
        .unwrap();

        assert!(matches!(
            store.ping().await,
            Err(PostStoreError::Unavailable(_))
        ));

        // Malformed ids never reach the server
        assert!(store.find_by_id("not-an-object-id").await.unwrap().is_none());
    }
}
