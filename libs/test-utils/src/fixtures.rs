//! Contract fixtures drawn from the taxi-job and product-catalogue clients.

use contract_core::interaction::{
    Interaction, ProviderState, RequestPattern, ResponseTemplate,
};
use contract_core::{ContractArtifact, Matcher, Participant};
use std::collections::BTreeMap;

/// Body matcher for the taxi job payload: nested customer shape, coordinate
/// strings and the return flag.
#[must_use]
pub fn job_body() -> Matcher {
    Matcher::shape()
        .field(
            "customer",
            Matcher::shape()
                .field("firstName", Matcher::string_type("Prince"))
                .field("lastName", Matcher::string_type("Ali"))
                .field("phoneNumber", Matcher::string_type("07456978900"))
                .build(),
        )
        .field("startLatitude", Matcher::string_type("53.35612531404332"))
        .field("startLongitude", Matcher::string_type("-2.277333661375856"))
        .field("endLatitude", Matcher::string_type("53.48064143725981"))
        .field("endLongitude", Matcher::string_type("-2.2423585050324775"))
        .field("return", Matcher::boolean_type(false))
        .build()
}

/// Body matcher for the product catalogue listing: at least one product, each
/// with id, name and type.
#[must_use]
pub fn products_body() -> Matcher {
    Matcher::shape()
        .field(
            "products",
            Matcher::array_min(
                1,
                Matcher::shape()
                    .field("id", Matcher::integer_type(10))
                    .field("name", Matcher::string_type("28 Degrees"))
                    .field("type", Matcher::string_type("CREDIT_CARD"))
                    .build(),
            ),
        )
        .build()
}

/// The `get job` interaction: `GET /job` given `a job exists`.
#[must_use]
pub fn job_interaction() -> Interaction {
    Interaction {
        description: "get job".to_string(),
        provider_state: Some(ProviderState::new("a job exists")),
        request: RequestPattern {
            method: "GET".to_string(),
            path: Matcher::literal("/job"),
            headers: BTreeMap::new(),
            body: None,
        },
        response: ResponseTemplate {
            status: 200,
            headers: BTreeMap::new(),
            body: Some(job_body()),
        },
    }
}

/// The `get products` interaction: `GET /products`.
#[must_use]
pub fn products_interaction() -> Interaction {
    Interaction {
        description: "get products".to_string(),
        provider_state: None,
        request: RequestPattern {
            method: "GET".to_string(),
            path: Matcher::literal("/products"),
            headers: BTreeMap::new(),
            body: None,
        },
        response: ResponseTemplate {
            status: 200,
            headers: BTreeMap::new(),
            body: Some(products_body()),
        },
    }
}

/// A complete artifact holding the job and products interactions.
#[must_use]
pub fn sample_artifact() -> ContractArtifact {
    ContractArtifact::new(
        Participant::new("SamirsApp"),
        Participant::new("JobService"),
        vec![job_interaction(), products_interaction()],
    )
}
