//! GraphQL API Module
//!
//! Typed access to the storefront's GraphQL endpoint.
//!
//! # Modules
//!
//! - [`graphql`] - Request/response envelopes and the operation traits
//! - [`operations`] - Every query and mutation the storefront issues
//! - [`cache`] - Query results kept for re-fetching after mutations
//! - [`http`] - `reqwest` transport with a persistent cookie jar
//! - [`client`] - The [`ApiClient`] tying transport and cache together

pub mod cache;
pub mod client;
pub mod graphql;
pub mod http;
pub mod operations;

pub use cache::QueryCache;
pub use client::ApiClient;
pub use graphql::{
    GraphQLErrorMessage, GraphQLRequest, GraphQLResponse, Mutation, NoVariables, Operation, Query,
    QueryKey,
};
pub use http::{GraphQLTransport, HttpTransport};
