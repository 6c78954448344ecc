//! Generic CRUD contract shared by every FMC resource type.
//!
//! A resource describes where its collection lives, which verbs the endpoint
//! accepts, which JSON fields must be present for each verb and from which
//! FMC version it exists. [`FmcClient`] turns that description into checked
//! `create`/`get`/`list`/`update`/`delete` calls.

use crate::client::FmcClient;
use crate::Result;
use fmc_core::{ApiDomain, Error, ObjectId, ServerVersion};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

/// HTTP verb a resource endpoint may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Operation {
    /// Verb name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of verbs an endpoint supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operations {
    /// GET supported
    pub get: bool,
    /// POST supported
    pub post: bool,
    /// PUT supported
    pub put: bool,
    /// DELETE supported
    pub delete: bool,
}

impl Operations {
    /// Full CRUD.
    pub const ALL: Self = Self::new(true, true, true, true);
    /// GET only.
    pub const READ_ONLY: Self = Self::new(true, false, false, false);
    /// Everything except DELETE.
    pub const NO_DELETE: Self = Self::new(true, true, true, false);
    /// GET and PUT, for objects the FMC creates itself.
    pub const GET_PUT: Self = Self::new(true, false, true, false);
    /// POST only.
    pub const POST_ONLY: Self = Self::new(false, true, false, false);

    /// Build a custom set.
    #[must_use]
    pub const fn new(get: bool, post: bool, put: bool, delete: bool) -> Self {
        Self {
            get,
            post,
            put,
            delete,
        }
    }

    /// Whether `operation` is in the set.
    #[must_use]
    pub const fn supports(self, operation: Operation) -> bool {
        match operation {
            Operation::Get => self.get,
            Operation::Post => self.post,
            Operation::Put => self.put,
            Operation::Delete => self.delete,
        }
    }
}

/// An FMC object type.
///
/// Required-field lists name JSON keys of the serialized resource; nested
/// keys use dots (`data.startTag`). A field counts as missing when it is
/// absent, `null`, an empty string or an empty array.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// FMC `type` value.
    const KIND: &'static str;
    /// API the collection lives under.
    const DOMAIN: ApiDomain = ApiDomain::Config;
    /// Verbs the endpoint accepts.
    const OPERATIONS: Operations = Operations::ALL;
    /// Fields required to GET.
    const REQUIRED_FOR_GET: &'static [&'static str] = &[];
    /// Fields required to POST.
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name"];
    /// Fields required to PUT.
    const REQUIRED_FOR_PUT: &'static [&'static str] = &["id"];
    /// Fields required to DELETE.
    const REQUIRED_FOR_DELETE: &'static [&'static str] = &["id"];
    /// Oldest FMC release exposing the endpoint.
    const FIRST_SUPPORTED_VERSION: ServerVersion = ServerVersion::new(6, 1, 0);

    /// Collection path relative to the API prefix, e.g. `object/hosts`.
    ///
    /// # Errors
    ///
    /// Container resources fail with [`Error::InvalidRequest`] when their
    /// parent id is unset.
    fn collection_path(&self) -> Result<String>;

    /// Server-assigned id.
    fn id(&self) -> Option<&ObjectId>;

    /// Object name.
    fn name(&self) -> Option<&str>;

    /// Extra query pairs for POST.
    fn post_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Extra query pairs for GET and list.
    fn get_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Copy client-side scope (parent ids, insert positions) from the
    /// request onto an object decoded from a response.
    fn inherit_scope(&mut self, _template: &Self) {}
}

/// Required fields absent from `value`.
#[must_use]
pub fn missing_fields(value: &Value, required: &[&'static str]) -> Vec<&'static str> {
    required
        .iter()
        .copied()
        .filter(|field| {
            let pointer = format!("/{}", field.replace('.', "/"));
            match value.pointer(&pointer) {
                None | Some(Value::Null) => true,
                Some(Value::String(text)) => text.trim().is_empty(),
                Some(Value::Array(items)) => items.is_empty(),
                Some(_) => false,
            }
        })
        .collect()
}

fn check_fields<T: Resource>(
    resource: &T,
    operation: Operation,
    required: &[&'static str],
) -> Result<()> {
    if required.is_empty() {
        return Ok(());
    }
    let value = serde_json::to_value(resource)?;
    let missing = missing_fields(&value, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::ValidationError(format!(
            "{} {operation} requires {}",
            T::KIND,
            missing.join(", ")
        )))
    }
}

fn check_operation<T: Resource>(operation: Operation) -> Result<()> {
    if T::OPERATIONS.supports(operation) {
        Ok(())
    } else {
        Err(Error::Unsupported(format!(
            "{} does not support {operation}",
            T::KIND
        )))
    }
}

impl FmcClient {
    async fn check_version<T: Resource>(&self) -> Result<()> {
        let version = self.server_version().await?;
        if version < T::FIRST_SUPPORTED_VERSION {
            return Err(Error::Unsupported(format!(
                "{} requires FMC {} or later, server runs {version}",
                T::KIND,
                T::FIRST_SUPPORTED_VERSION
            )));
        }
        Ok(())
    }

    async fn precheck<T: Resource>(
        &self,
        resource: &T,
        operation: Operation,
        required: &[&'static str],
    ) -> Result<()> {
        check_operation::<T>(operation)?;
        check_fields(resource, operation, required)?;
        resource.collection_path()?;
        self.check_version::<T>().await
    }

    /// Check that `resource` can be fetched: GET supported, id or name set,
    /// required fields present and the server new enough.
    ///
    /// # Errors
    ///
    /// Returns the first failed precondition.
    pub async fn valid_for_get<T: Resource>(&self, resource: &T) -> Result<()> {
        check_operation::<T>(Operation::Get)?;
        if resource.id().is_none() && resource.name().is_none() {
            return Err(Error::InvalidRequest(format!(
                "{} GET needs an id or a name",
                T::KIND
            )));
        }
        self.precheck(resource, Operation::Get, T::REQUIRED_FOR_GET).await
    }

    /// Check that `resource` can be created.
    ///
    /// # Errors
    ///
    /// Returns the first failed precondition.
    pub async fn valid_for_post<T: Resource>(&self, resource: &T) -> Result<()> {
        self.precheck(resource, Operation::Post, T::REQUIRED_FOR_POST).await
    }

    /// Check that `resource` can be updated.
    ///
    /// # Errors
    ///
    /// Returns the first failed precondition.
    pub async fn valid_for_put<T: Resource>(&self, resource: &T) -> Result<()> {
        self.precheck(resource, Operation::Put, T::REQUIRED_FOR_PUT).await
    }

    /// Check that `resource` can be deleted.
    ///
    /// # Errors
    ///
    /// Returns the first failed precondition.
    pub async fn valid_for_delete<T: Resource>(&self, resource: &T) -> Result<()> {
        self.precheck(resource, Operation::Delete, T::REQUIRED_FOR_DELETE)
            .await
    }

    /// POST `resource` to its collection and return the stored object.
    ///
    /// # Errors
    ///
    /// Returns a precondition error without issuing a request, or the
    /// FMC's error.
    pub async fn create<T: Resource>(&self, resource: &T) -> Result<T> {
        self.valid_for_post(resource).await?;
        let path = resource.collection_path()?;
        info!(kind = T::KIND, name = ?resource.name(), "Creating FMC object");
        let mut created: T = self
            .post_json(T::DOMAIN, &path, resource, &resource.post_params())
            .await?;
        created.inherit_scope(resource);
        Ok(created)
    }

    /// Fetch `resource` by id, or by exact name when no id is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no object carries the name.
    pub async fn get<T: Resource>(&self, resource: &T) -> Result<T> {
        self.valid_for_get(resource).await?;
        let path = resource.collection_path()?;
        let params = resource.get_params();

        let mut found: T = match (resource.id(), resource.name()) {
            (Some(id), _) => {
                self.get_json(T::DOMAIN, &format!("{path}/{id}"), &params)
                    .await?
            }
            (None, Some(name)) => {
                debug!(kind = T::KIND, name, "Looking up FMC object by name");
                let items: Vec<T> = self.get_all(T::DOMAIN, &path, &params).await?;
                items
                    .into_iter()
                    .find(|item| item.name() == Some(name))
                    .ok_or_else(|| {
                        Error::NotFound(format!("{} named `{name}` does not exist", T::KIND))
                    })?
            }
            (None, None) => {
                return Err(Error::InvalidRequest(format!(
                    "{} GET needs an id or a name",
                    T::KIND
                )))
            }
        };
        found.inherit_scope(resource);
        Ok(found)
    }

    /// List every object of the collection `template` points at.
    ///
    /// # Errors
    ///
    /// Returns an error if GET is unsupported or a page request fails.
    pub async fn list<T: Resource>(&self, template: &T) -> Result<Vec<T>> {
        check_operation::<T>(Operation::Get)?;
        let path = template.collection_path()?;
        self.check_version::<T>().await?;

        let mut items: Vec<T> = self
            .get_all(T::DOMAIN, &path, &template.get_params())
            .await?;
        for item in &mut items {
            item.inherit_scope(template);
        }
        Ok(items)
    }

    /// PUT `resource` to `collection/id`.
    ///
    /// # Errors
    ///
    /// Returns a precondition error without issuing a request, or the
    /// FMC's error.
    pub async fn update<T: Resource>(&self, resource: &T) -> Result<T> {
        self.valid_for_put(resource).await?;
        let path = item_path(resource)?;
        info!(kind = T::KIND, path = %path, "Updating FMC object");
        let mut updated: T = self.put_json(T::DOMAIN, &path, resource, &[]).await?;
        updated.inherit_scope(resource);
        Ok(updated)
    }

    /// DELETE `collection/id`, returning the deleted object.
    ///
    /// # Errors
    ///
    /// Returns a precondition error without issuing a request, or the
    /// FMC's error.
    pub async fn delete<T: Resource>(&self, resource: &T) -> Result<T> {
        self.valid_for_delete(resource).await?;
        let path = item_path(resource)?;
        info!(kind = T::KIND, path = %path, "Deleting FMC object");
        let deleted: Option<T> = self.delete_json(T::DOMAIN, &path, &[]).await?;
        let mut deleted = deleted.unwrap_or_else(|| resource.clone());
        deleted.inherit_scope(resource);
        Ok(deleted)
    }
}

/// Collection path of a resource nested under a parent object, e.g.
/// `policy/accesspolicies/{id}/accessrules`.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] when `parent` is unset.
pub fn nested_path(
    kind: &str,
    parent: Option<&ObjectId>,
    parent_collection: &str,
    child: &str,
) -> Result<String> {
    let parent = parent.ok_or_else(|| {
        Error::InvalidRequest(format!("{kind} needs the id of its parent object"))
    })?;
    Ok(format!("{parent_collection}/{parent}/{child}"))
}

fn item_path<T: Resource>(resource: &T) -> Result<String> {
    let id = resource
        .id()
        .ok_or_else(|| Error::ValidationError(format!("{} requires id", T::KIND)))?;
    Ok(format!("{}/{id}", resource.collection_path()?))
}

/// Implement [`Resource`] for a top-level object with `id` and `name`
/// fields of type `Option<ObjectId>` and `Option<String>`.
///
/// ```ignore
/// fmc_resource!(Host, "Host", "object/hosts");
/// fmc_resource!(Application, "Application", "object/applications", {
///     const OPERATIONS: Operations = Operations::READ_ONLY;
/// });
/// ```
#[macro_export]
macro_rules! fmc_resource {
    ($ty:ty, $kind:literal, $path:literal) => {
        $crate::fmc_resource!($ty, $kind, $path, {});
    };
    ($ty:ty, $kind:literal, $path:literal, { $($body:tt)* }) => {
        impl $crate::Resource for $ty {
            const KIND: &'static str = $kind;
            $($body)*

            fn collection_path(&self) -> $crate::Result<::std::string::String> {
                ::std::result::Result::Ok(::std::string::String::from($path))
            }

            fn id(&self) -> ::std::option::Option<&$crate::ObjectId> {
                self.id.as_ref()
            }

            fn name(&self) -> ::std::option::Option<&str> {
                self.name.as_deref()
            }
        }
    };
}
