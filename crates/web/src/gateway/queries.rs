//! GraphQL operation definitions for the Orderdesk API.

use graphql_client::GraphQLQuery;

// User queries
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/users.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetUsers;

// Order queries
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/orders.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetOrders;

// Auth mutations
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/auth.graphql",
    response_derives = "Debug, Clone"
)]
pub struct Login;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/auth.graphql",
    response_derives = "Debug, Clone"
)]
pub struct CreateUser;
