use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContainerError>;

/// Boxed failure raised by user code (constructors, producers, hooks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Invalid bean definition for {type_name}: {reason}")]
    InvalidDefinition { type_name: String, reason: String },

    #[error("Cannot alias '{alias}': no bean definition registered for {type_name}")]
    UnknownType { alias: String, type_name: String },

    #[error("No bean found for: {requested}")]
    NoBeanFound { requested: String },

    #[error("Ambiguous bean for {requested}: {reason} ({candidates})")]
    AmbiguousBean {
        requested: String,
        reason: AmbiguityReason,
        candidates: String,
    },

    #[error("Failed to instantiate {type_name}: {source}")]
    Instantiation {
        type_name: String,
        #[source]
        source: BoxError,
    },

    #[error("Factory method '{method}' failed to create {type_name}: {source}")]
    BeanCreation {
        type_name: String,
        method: String,
        #[source]
        source: BoxError,
    },

    #[error("Factory method '{method}' for {type_name} has no configuration instance")]
    MissingFactoryOwner { type_name: String, method: String },

    #[error("Field injection failed for {owner}.{field}: {source}")]
    Injection {
        owner: String,
        field: String,
        #[source]
        source: Box<ContainerError>,
    },

    #[error("Post-initialize method '{method}' failed for {type_name}: {source}")]
    PostInit {
        type_name: String,
        method: String,
        #[source]
        source: BoxError,
    },

    #[error("Resolved bean is not a {expected}")]
    TypeMismatch { expected: String },

    #[error("Circular dependency detected: {chain}")]
    CyclicDependency { chain: String },

    #[error("Resolution depth limit of {limit} exceeded while resolving {type_name}")]
    ResolutionDepthExceeded { type_name: String, limit: usize },

    #[error("Component discovery failed for '{root}': {message}")]
    Discovery { root: String, message: String },

    #[error("Invalid container configuration: {0}")]
    Config(String),
}

/// Why candidate selection could not settle on a single definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum AmbiguityReason {
    #[strum(to_string = "multiple candidates, none primary")]
    NoPrimary,
    #[strum(to_string = "multiple primary candidates")]
    MultiplePrimary,
}

impl ContainerError {
    pub(crate) fn type_mismatch(expected: &str) -> Self {
        ContainerError::TypeMismatch {
            expected: expected.to_string(),
        }
    }

    /// Unwraps nested field-injection failures down to the error that started them.
    pub fn root_cause(&self) -> &ContainerError {
        let mut current = self;
        while let ContainerError::Injection { source, .. } = current {
            current = source.as_ref();
        }
        current
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ContainerError::NoBeanFound { .. })
    }
}

impl From<serde_json::Error> for ContainerError {
    fn from(err: serde_json::Error) -> Self {
        ContainerError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_injection_chain() {
        let inner = ContainerError::CyclicDependency {
            chain: "A -> B -> A".to_string(),
        };
        let err = ContainerError::Injection {
            owner: "A".to_string(),
            field: "b".to_string(),
            source: Box::new(ContainerError::Injection {
                owner: "B".to_string(),
                field: "a".to_string(),
                source: Box::new(inner),
            }),
        };

        assert!(matches!(
            err.root_cause(),
            ContainerError::CyclicDependency { .. }
        ));
        assert!(err.to_string().contains("A.b"));
    }

    #[test]
    fn test_ambiguity_messages() {
        let err = ContainerError::AmbiguousBean {
            requested: "dyn Greeter".to_string(),
            reason: AmbiguityReason::NoPrimary,
            candidates: "English, French".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Ambiguous bean for dyn Greeter: multiple candidates, none primary (English, French)"
        );
        assert_eq!(
            AmbiguityReason::MultiplePrimary.to_string(),
            "multiple primary candidates"
        );
    }
}
