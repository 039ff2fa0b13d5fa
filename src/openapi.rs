//! OpenAPI documents built from registered routes.
//!
//! Each route contributes one operation: the payload schema becomes the
//! request body, the response schema the body of the success response, and
//! every named schema is added to `components`. Routes registered with
//! `include_in_schema` off are skipped.

use axum::http::Method;
use utoipa::openapi::path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::{Array, KnownFormat, ObjectBuilder, Schema, SchemaFormat, Type};
use utoipa::openapi::{
    ComponentsBuilder, ContentBuilder, Deprecated, InfoBuilder, OpenApi, OpenApiBuilder, Paths,
    Ref, RefOr, Required, Response, ResponseBuilder,
};

use crate::routes::RegisteredRoute;
use crate::schema::{Operation, SchemaRef};

const JSON: &str = "application/json";

#[must_use]
pub fn build_openapi(routes: &[RegisteredRoute], title: &str, version: &str) -> OpenApi {
    let mut paths = Paths::new();
    let mut components = ComponentsBuilder::new();

    for route in routes.iter().filter(|route| route.docs.include_in_schema) {
        let resource = resource_slug(&route.prefix);
        let docs = &route.docs;
        let mut operation = OperationBuilder::new()
            .operation_id(Some(
                docs.name
                    .clone()
                    .unwrap_or_else(|| format!("{}_{resource}", route.endpoint_name)),
            ))
            .summary(Some(
                docs.summary
                    .clone()
                    .unwrap_or_else(|| summary(route.operation, &resource)),
            ))
            .description(docs.description.clone())
            .deprecated(docs.deprecated.then_some(Deprecated::True))
            .tags((!route.tags.is_empty()).then(|| route.tags.clone()));

        if route.operation.takes_id() {
            operation = operation.parameter(
                ParameterBuilder::new()
                    .name("id")
                    .parameter_in(ParameterIn::Path)
                    .required(Required::True)
                    .schema(Some(uuid_schema())),
            );
        }

        if let Some(payload) = &route.schema.payload {
            components = add_components(components, payload);
            operation = operation.request_body(Some(
                RequestBodyBuilder::new()
                    .content(JSON, ContentBuilder::new().schema(Some(reference(payload))).build())
                    .required(Some(Required::True))
                    .build(),
            ));
        }

        let description = route
            .status_code
            .canonical_reason()
            .unwrap_or("Success")
            .to_string();
        let response: Response = match &route.schema.response {
            Some(response) => {
                components = add_components(components, response);
                ResponseBuilder::new()
                    .description(description)
                    .content(JSON, ContentBuilder::new().schema(Some(reference(response))).build())
                    .build()
            }
            None => ResponseBuilder::new().description(description).build(),
        };
        operation = operation.response(route.status_code.as_u16().to_string(), response);
        if route.operation.takes_id() {
            operation = operation.response(
                "404",
                ResponseBuilder::new().description("Not Found").build(),
            );
        }

        paths.add_path_operation(&route.path, vec![http_method(&route.method)], operation.build());
    }

    OpenApiBuilder::new()
        .info(InfoBuilder::new().title(title).version(version).build())
        .paths(paths)
        .components(Some(components.build()))
        .build()
}

fn add_components(components: ComponentsBuilder, schema: &SchemaRef) -> ComponentsBuilder {
    schema
        .dependencies()
        .iter()
        .fold(components, |components, (name, dependency)| {
            components.schema(name.clone(), dependency.clone())
        })
        .schema(schema.name(), schema.schema().clone())
}

fn uuid_schema() -> Schema {
    Schema::Object(
        ObjectBuilder::new()
            .schema_type(Type::String)
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Uuid)))
            .build(),
    )
}

fn reference(schema: &SchemaRef) -> RefOr<Schema> {
    let named = Ref::from_schema_name(schema.name());
    if schema.is_array() {
        RefOr::T(Schema::Array(Array::new(named)))
    } else {
        RefOr::Ref(named)
    }
}

fn resource_slug(prefix: &str) -> String {
    let slug = prefix.trim_matches('/').replace('/', "_");
    if slug.is_empty() { "root".to_string() } else { slug }
}

fn summary(operation: Operation, resource: &str) -> String {
    match operation {
        Operation::List => format!("List {resource}"),
        Operation::Retrieve => format!("Retrieve one of {resource}"),
        Operation::Create => format!("Create one of {resource}"),
        Operation::Update => format!("Replace one of {resource}"),
        Operation::PartialUpdate => format!("Partially update one of {resource}"),
        Operation::Destroy => format!("Delete one of {resource}"),
    }
}

fn http_method(method: &Method) -> HttpMethod {
    match *method {
        Method::POST => HttpMethod::Post,
        Method::PUT => HttpMethod::Put,
        Method::PATCH => HttpMethod::Patch,
        Method::DELETE => HttpMethod::Delete,
        Method::HEAD => HttpMethod::Head,
        Method::OPTIONS => HttpMethod::Options,
        Method::TRACE => HttpMethod::Trace,
        _ => HttpMethod::Get,
    }
}
