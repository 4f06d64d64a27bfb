mod loader;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::descriptor::SecurityRequirement;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The YAML could not be parsed or did not match the expected shape.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// The values parsed but are not usable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which OpenAPI revision the document declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenApiVersion {
    #[serde(rename = "3.0.3", alias = "3.0")]
    V3_0,
    #[default]
    #[serde(rename = "3.1.0", alias = "3.1")]
    V3_1,
}

impl OpenApiVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            OpenApiVersion::V3_0 => "3.0.3",
            OpenApiVersion::V3_1 => "3.1.0",
        }
    }
}

/// What happens when a documentation example does not fit its schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExampleValidation {
    /// Examples are not inspected.
    Off,
    /// Mismatches become diagnostics.
    #[default]
    Advisory,
    /// Mismatches abort assembly.
    Strict,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// SPDX identifier (3.1 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Query,
    Cookie,
}

/// A security scheme, serialized in its OpenAPI shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SecurityScheme {
    Http {
        scheme: String,
        #[serde(
            default,
            rename = "bearerFormat",
            alias = "bearer_format",
            skip_serializing_if = "Option::is_none"
        )]
        bearer_format: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    #[serde(alias = "api_key")]
    ApiKey {
        name: String,
        #[serde(rename = "in")]
        location: ApiKeyLocation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl SecurityScheme {
    /// `Authorization: Bearer <token>`, optionally naming the token format.
    pub fn bearer(format: Option<&str>) -> Self {
        SecurityScheme::Http {
            scheme: "bearer".into(),
            bearer_format: format.map(str::to_string),
            description: None,
        }
    }

    pub fn basic() -> Self {
        SecurityScheme::Http {
            scheme: "basic".into(),
            bearer_format: None,
            description: None,
        }
    }

    pub fn api_key(location: ApiKeyLocation, name: &str) -> Self {
        SecurityScheme::ApiKey {
            name: name.to_string(),
            location,
            description: None,
        }
    }
}

/// Global document metadata plus engine options.
///
/// Build it fluently or load it from YAML. In an application file the
/// settings may sit under an `openapi:` key:
///
/// ```yaml
/// openapi:
///   title: Swagger Petstore
///   version: 1.0.0
///   docs_ui: true
///   security_schemes:
///     bearerAuth: { type: http, scheme: bearer, bearerFormat: JWT }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenApiConfig {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
    pub servers: Vec<Server>,
    pub tags: Vec<Tag>,
    pub security_schemes: BTreeMap<String, SecurityScheme>,
    /// Requirements applied to every operation that declares none.
    pub security: Vec<SecurityRequirement>,
    pub openapi_version: OpenApiVersion,
    /// Emit an explicit nullable marker besides dropping the field from `required`.
    pub explicit_nullable: bool,
    pub example_validation: ExampleValidation,
    pub spec_path: String,
    pub docs_path: String,
    pub docs_ui: bool,
    pub pretty: bool,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            version: "0.1.0".to_string(),
            description: None,
            terms_of_service: None,
            contact: None,
            license: None,
            servers: Vec::new(),
            tags: Vec::new(),
            security_schemes: BTreeMap::new(),
            security: Vec::new(),
            openapi_version: OpenApiVersion::default(),
            explicit_nullable: false,
            example_validation: ExampleValidation::default(),
            spec_path: "/openapi.json".to_string(),
            docs_path: "/docs".to_string(),
            docs_ui: false,
            pretty: true,
        }
    }
}

impl OpenApiConfig {
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            title: title.to_string(),
            version: version.to_string(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_terms_of_service(mut self, url: &str) -> Self {
        self.terms_of_service = Some(url.to_string());
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }

    pub fn with_license(mut self, name: &str) -> Self {
        self.license = Some(License {
            name: name.to_string(),
            url: None,
            identifier: None,
        });
        self
    }

    pub fn with_server(mut self, url: &str, description: Option<&str>) -> Self {
        self.servers.push(Server {
            url: url.to_string(),
            description: description.map(str::to_string),
        });
        self
    }

    pub fn with_tag(mut self, name: &str, description: Option<&str>) -> Self {
        self.tags.push(Tag {
            name: name.to_string(),
            description: description.map(str::to_string),
        });
        self
    }

    pub fn with_security_scheme(mut self, name: &str, scheme: SecurityScheme) -> Self {
        self.security_schemes.insert(name.to_string(), scheme);
        self
    }

    pub fn with_default_security(mut self, requirement: SecurityRequirement) -> Self {
        self.security.push(requirement);
        self
    }

    pub fn with_openapi_version(mut self, version: OpenApiVersion) -> Self {
        self.openapi_version = version;
        self
    }

    pub fn with_explicit_nullable(mut self, enabled: bool) -> Self {
        self.explicit_nullable = enabled;
        self
    }

    pub fn with_example_validation(mut self, policy: ExampleValidation) -> Self {
        self.example_validation = policy;
        self
    }

    pub fn with_spec_path(mut self, path: &str) -> Self {
        self.spec_path = path.to_string();
        self
    }

    pub fn with_docs_path(mut self, path: &str) -> Self {
        self.docs_path = path.to_string();
        self
    }

    pub fn with_docs_ui(mut self, enabled: bool) -> Self {
        self.docs_ui = enabled;
        self
    }

    pub fn with_pretty(mut self, enabled: bool) -> Self {
        self.pretty = enabled;
        self
    }

    /// Parse a config from YAML, either bare or under an `openapi:` key.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let root = loader::load_yaml_str(yaml)?;
        Self::from_yaml_value(root)
    }

    /// Load a config file. Unlike the layered loader, the file must exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match loader::load_yaml_file(path)? {
            Some(root) => Self::from_yaml_value(root),
            None => Err(ConfigError::Io {
                path: path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            }),
        }
    }

    /// Layered load from `dir`: `application.yaml`, then
    /// `application-{profile}.yaml` merged over it. Missing files are skipped,
    /// so an empty directory yields the defaults.
    ///
    /// The `APISCRIBE_PROFILE` environment variable overrides `profile`.
    pub fn load_profile(dir: impl AsRef<Path>, profile: &str) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let active_profile =
            std::env::var("APISCRIBE_PROFILE").unwrap_or_else(|_| profile.to_string());

        let mut root = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
        if let Some(base) = loader::load_yaml_file(&dir.join("application.yaml"))? {
            loader::merge_yaml(&mut root, base);
        }
        let profile_file = dir.join(format!("application-{active_profile}.yaml"));
        if let Some(overlay) = loader::load_yaml_file(&profile_file)? {
            loader::merge_yaml(&mut root, overlay);
        }
        tracing::debug!(profile = %active_profile, dir = %dir.display(), "openapi config loaded");
        Self::from_yaml_value(root)
    }

    fn from_yaml_value(root: serde_yaml::Value) -> Result<Self, ConfigError> {
        let section = loader::select_section(root, "openapi");
        let config: OpenApiConfig = serde_yaml::from_value(section)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings that cannot be expressed in the types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Invalid("title must not be empty".into()));
        }
        if self.version.trim().is_empty() {
            return Err(ConfigError::Invalid("version must not be empty".into()));
        }
        for (key, path) in [("spec_path", &self.spec_path), ("docs_path", &self.docs_path)] {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "{key} must start with '/', got `{path}`"
                )));
            }
        }
        if self.docs_ui && self.docs_path == self.spec_path {
            return Err(ConfigError::Invalid(
                "docs_path and spec_path must differ".into(),
            ));
        }
        for requirement in &self.security {
            if !self.security_schemes.contains_key(&requirement.scheme) {
                return Err(ConfigError::Invalid(format!(
                    "default security references unknown scheme `{}`",
                    requirement.scheme
                )));
            }
        }
        Ok(())
    }
}
