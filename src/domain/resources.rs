//! Templated resources exposed via Model Context Protocol
//!
//! Provides the `greeting://{name}` resource and the registry that matches
//! `resources/read` URIs against compiled templates.

use async_trait::async_trait;
use rust_mcp_sdk::schema::{
    ReadResourceContent, ReadResourceRequestParams, ReadResourceResult, ResourceTemplate,
    TextResourceContents,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::AppError;
use crate::mcp::rpc::{
    app_error_to_json_rpc, json_rpc_error, json_rpc_error_with_data, json_rpc_result,
    INVALID_PARAMS, METHOD_NOT_FOUND,
};
use crate::mcp::uri_template::{TemplateParams, UriTemplate};

/// One registered templated resource: discovery metadata plus the resolver
/// that turns a matched URI into content entries. Resolvers receive the
/// requested URI verbatim together with the placeholder values extracted
/// from it.
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    fn definition(&self) -> ResourceTemplate;
    async fn resolve(
        &self,
        uri: &str,
        params: &TemplateParams,
    ) -> Result<Vec<TextResourceContents>, AppError>;
}

pub struct GreetingResource;

#[async_trait]
impl ResourceResolver for GreetingResource {
    fn definition(&self) -> ResourceTemplate {
        ResourceTemplate {
            annotations: None,
            description: Some("Dynamic greeting generator".to_string()),
            icons: vec![],
            meta: None,
            mime_type: None,
            name: "greeting".to_string(),
            title: Some("Greeting Resource".to_string()),
            uri_template: "greeting://{name}".to_string(),
        }
    }

    /// Direct substitution, no validation of `name`. An empty placeholder
    /// still greets: `greeting://` resolves to "Hello, !".
    async fn resolve(
        &self,
        uri: &str,
        params: &TemplateParams,
    ) -> Result<Vec<TextResourceContents>, AppError> {
        let name = params.get("name").map(String::as_str).unwrap_or_default();

        Ok(vec![TextResourceContents {
            meta: None,
            mime_type: None,
            text: format!("Hello, {name}!"),
            uri: uri.to_string(),
        }])
    }
}

struct RegisteredResource {
    name: String,
    template: UriTemplate,
    resolver: Box<dyn ResourceResolver>,
}

/// Ordered resource collection, built once at startup and read-only
/// afterwards. Templates are compiled at registration; `resources/read`
/// matches them in registration order and the first match wins.
pub struct ResourceRegistry {
    resources: Vec<RegisteredResource>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    /// Panics on a duplicate name or an uncompilable URI template;
    /// registration is a startup-time operation and both are programming
    /// errors.
    pub fn register(&mut self, resolver: impl ResourceResolver + 'static) {
        let definition = resolver.definition();
        let name = definition.name;
        if self.resources.iter().any(|resource| resource.name == name) {
            panic!("duplicate resource registration: {name}");
        }

        let template = match UriTemplate::compile(&definition.uri_template) {
            Ok(template) => template,
            Err(error) => panic!("invalid uri template for resource {name}: {error}"),
        };

        debug!(name = %name, template = %template.raw(), "resource registered");
        self.resources.push(RegisteredResource {
            name,
            template,
            resolver: Box::new(resolver),
        });
    }

    pub fn templates(&self) -> Vec<ResourceTemplate> {
        self.resources
            .iter()
            .map(|resource| resource.resolver.definition())
            .collect()
    }

    pub async fn handle_read(&self, id: Option<Value>, params: Option<Value>) -> Value {
        let Some(raw_params) = params else {
            return json_rpc_error(id, INVALID_PARAMS, "Invalid params");
        };

        let resource_read: ReadResourceRequestParams = match serde_json::from_value(raw_params) {
            Ok(value) => value,
            Err(_) => return json_rpc_error(id, INVALID_PARAMS, "Invalid params"),
        };

        let matched = self.resources.iter().find_map(|resource| {
            resource
                .template
                .match_uri(&resource_read.uri)
                .map(|params| (resource, params))
        });

        let Some((resource, template_params)) = matched else {
            return json_rpc_error_with_data(
                id,
                METHOD_NOT_FOUND,
                "Method not found",
                Some(json!({
                    "code": "resource_not_found",
                    "message": "unknown resource uri",
                    "details": {
                        "uri": resource_read.uri,
                    },
                })),
            );
        };

        match resource
            .resolver
            .resolve(&resource_read.uri, &template_params)
            .await
        {
            Ok(contents) => json_rpc_result(
                id,
                serde_json::to_value(ReadResourceResult {
                    contents: contents.into_iter().map(ReadResourceContent::from).collect(),
                    meta: None,
                })
                .expect("read resource result serialization"),
            ),
            Err(err) => app_error_to_json_rpc(id, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{GreetingResource, ResourceRegistry, ResourceResolver};
    use crate::mcp::uri_template::TemplateParams;

    fn registry() -> ResourceRegistry {
        let mut registry = ResourceRegistry::new();
        registry.register(GreetingResource);
        registry
    }

    #[tokio::test]
    async fn greeting_substitutes_the_extracted_name() {
        let params = TemplateParams::from_iter([("name".to_string(), "Alice".to_string())]);
        let contents = GreetingResource
            .resolve("greeting://Alice", &params)
            .await
            .expect("greeting always succeeds");

        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].text, "Hello, Alice!");
        assert_eq!(contents[0].uri, "greeting://Alice");
    }

    #[tokio::test]
    async fn greeting_accepts_an_empty_name() {
        let params = TemplateParams::from_iter([("name".to_string(), String::new())]);
        let contents = GreetingResource
            .resolve("greeting://", &params)
            .await
            .expect("greeting always succeeds");

        assert_eq!(contents[0].text, "Hello, !");
    }

    #[test]
    fn templates_expose_the_greeting_definition() {
        let templates = registry().templates();

        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "greeting");
        assert_eq!(templates[0].uri_template, "greeting://{name}");
        assert_eq!(templates[0].title.as_deref(), Some("Greeting Resource"));
    }

    #[test]
    #[should_panic(expected = "duplicate resource registration")]
    fn duplicate_registration_panics() {
        let mut registry = ResourceRegistry::new();
        registry.register(GreetingResource);
        registry.register(GreetingResource);
    }

    #[tokio::test]
    async fn handle_read_resolves_a_matching_uri() {
        let response = registry()
            .handle_read(Some(json!(1)), Some(json!({ "uri": "greeting://Bob" })))
            .await;

        let contents = &response["result"]["contents"];
        assert_eq!(contents[0]["text"], "Hello, Bob!");
        assert_eq!(contents[0]["uri"], "greeting://Bob");
    }

    #[tokio::test]
    async fn handle_read_reports_unknown_uris() {
        let response = registry()
            .handle_read(Some(json!(2)), Some(json!({ "uri": "farewell://Bob" })))
            .await;

        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(response["error"]["data"]["code"], "resource_not_found");
        assert_eq!(response["error"]["data"]["details"]["uri"], "farewell://Bob");
    }

    #[tokio::test]
    async fn handle_read_requires_params() {
        let response = registry().handle_read(Some(json!(3)), None).await;
        assert_eq!(response["error"]["code"], -32602);
    }
}
