//! GraphQL operation definitions for WPGraphQL / WooGraphQL.
//!
//! Each struct derives its `Variables` and `ResponseData` types from the
//! reduced schema in `graphql/schema.graphql` and the documents under
//! `graphql/queries/`.

use graphql_client::GraphQLQuery;

// Catalog
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/catalog.graphql",
    response_derives = "Debug, Clone",
    variables_derives = "Debug"
)]
pub struct GetProducts;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/catalog.graphql",
    response_derives = "Debug, Clone",
    variables_derives = "Debug"
)]
pub struct GetProductBySlug;

// Cart queries and mutations
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/cart.graphql",
    response_derives = "Debug, Clone",
    variables_derives = "Debug"
)]
pub struct GetCart;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/cart.graphql",
    response_derives = "Debug, Clone",
    variables_derives = "Debug"
)]
pub struct AddToCart;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/cart.graphql",
    response_derives = "Debug, Clone",
    variables_derives = "Debug"
)]
pub struct UpdateItemQuantities;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/cart.graphql",
    response_derives = "Debug, Clone",
    variables_derives = "Debug"
)]
pub struct RemoveItemsFromCart;

// Content and account
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/content.graphql",
    response_derives = "Debug, Clone",
    variables_derives = "Debug"
)]
pub struct GetPageByUri;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/content.graphql",
    response_derives = "Debug, Clone",
    variables_derives = "Debug"
)]
pub struct GetAccount;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/content.graphql",
    response_derives = "Debug, Clone",
    variables_derives = "Debug"
)]
pub struct Ping;
