use super::{CrudController, Operation, Resource, operation_id};
use crate::domain::base::{DeleteOutcome, Entity, UpdateOutcome};
use crate::shared::error::ErrorResponse;
use crate::shared::pagination::{FilterQuery, PaginationQuery};
use utoipa::openapi::path::{
    HttpMethod, OperationBuilder, Parameter, ParameterBuilder, ParameterIn,
};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::response::{Response, ResponseBuilder};
use utoipa::openapi::schema::{
    ArrayBuilder, KnownFormat, ObjectBuilder, Schema, SchemaFormat, Type,
};
use utoipa::openapi::security::SecurityRequirement;
use utoipa::openapi::tag::TagBuilder;
use utoipa::openapi::{
    ComponentsBuilder, ContentBuilder, OpenApi, OpenApiBuilder, Paths, Ref, RefOr, Required,
};
use utoipa::{IntoParams, PartialSchema, ToSchema};

const JSON: &str = "application/json";

fn reference<T: ToSchema>() -> RefOr<Schema> {
    Ref::from_schema_name(T::name()).into()
}

fn integer() -> RefOr<Schema> {
    RefOr::T(Schema::Object(
        ObjectBuilder::new()
            .schema_type(Type::Integer)
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Int64)))
            .build(),
    ))
}

fn array(items: RefOr<Schema>) -> RefOr<Schema> {
    RefOr::T(Schema::Array(ArrayBuilder::new().items(items).build()))
}

fn page(items: RefOr<Schema>) -> RefOr<Schema> {
    RefOr::T(Schema::Object(
        ObjectBuilder::new()
            .property("data", array(items))
            .required("data")
            .property("count", integer())
            .required("count")
            .property("total", integer())
            .required("total")
            .build(),
    ))
}

fn json_response(description: &str, schema: RefOr<Schema>) -> Response {
    ResponseBuilder::new()
        .description(description)
        .content(JSON, ContentBuilder::new().schema(Some(schema)).build())
        .build()
}

fn id_parameter() -> Parameter {
    ParameterBuilder::new()
        .name("id")
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .description(Some("Record id"))
        .schema(Some(integer()))
        .build()
}

impl<R: Resource> CrudController<R> {
    /// OpenAPI paths and schemas of the routes mounted at `base_path`.
    pub fn openapi(&self, base_path: &str) -> OpenApi {
        let name = <R::Entity as Entity>::NAME;
        let base = base_path.trim_end_matches('/');
        let auth = self.auth();

        let operation = |op: Operation, summary: &str| {
            let builder = OperationBuilder::new()
                .operation_id(Some(operation_id(name, op.name())))
                .summary(Some(summary))
                .tags(Some(vec![name]))
                .response(
                    "400",
                    json_response("Invalid request", reference::<ErrorResponse>()),
                );

            if auth.requires(op) {
                builder
                    .security(SecurityRequirement::new("bearer_auth", Vec::<String>::new()))
                    .response(
                        "401",
                        json_response("Missing or invalid token", reference::<ErrorResponse>()),
                    )
            } else {
                builder
            }
        };

        let view = reference::<R::View>;
        let body = |schema: RefOr<Schema>| {
            Some(
                RequestBodyBuilder::new()
                    .content(JSON, ContentBuilder::new().schema(Some(schema)).build())
                    .required(Some(Required::True))
                    .build(),
            )
        };

        let root = operation(Operation::Root, &format!("Find {} records matching a filter", name))
            .parameters(Some(FilterQuery::into_params(|| Some(ParameterIn::Query))))
            .response("200", json_response("Matching records", array(view())));

        let count = operation(Operation::Count, &format!("Count {} records", name))
            .response("200", json_response("Number of records", integer()));

        let pagination = operation(Operation::Pagination, &format!("Page through {} records", name))
            .parameters(Some(PaginationQuery::into_params(|| Some(ParameterIn::Query))))
            .response("200", json_response("One page of records", page(view())));

        let get_by_id = operation(Operation::GetById, &format!("Find a {} by id", name))
            .parameter(id_parameter())
            .response("200", json_response("The record", view()))
            .response(
                "404",
                json_response("No record with this id", reference::<ErrorResponse>()),
            );

        let create = operation(Operation::Create, &format!("Create a {}", name))
            .request_body(body(reference::<R::Create>()))
            .response("201", json_response("Created record", view()));

        let update_or_create = operation(
            Operation::UpdateOrCreate,
            &format!("Update a {} by id, or create it when the id is unknown", name),
        )
        .request_body(body(reference::<R::Update>()))
        .response("200", json_response("Record updated", reference::<UpdateOutcome>()))
        .response("201", json_response("Record created", view()));

        let update = operation(Operation::Update, &format!("Update a {}", name))
            .request_body(body(reference::<R::Update>()))
            .response("200", json_response("Update outcome", reference::<UpdateOutcome>()));

        let delete = operation(Operation::Delete, &format!("Delete a {} by id", name))
            .parameter(id_parameter())
            .response("200", json_response("Delete outcome", reference::<DeleteOutcome>()));

        let mut paths = Paths::new();
        let mut add = |path: String, method: HttpMethod, operation: OperationBuilder| {
            paths.add_path_operation(path, vec![method], operation.build());
        };
        add(base.to_string(), HttpMethod::Get, root);
        add(base.to_string(), HttpMethod::Post, create);
        add(base.to_string(), HttpMethod::Put, update_or_create);
        add(base.to_string(), HttpMethod::Patch, update);
        add(format!("{}/count", base), HttpMethod::Get, count);
        add(format!("{}/pagination", base), HttpMethod::Get, pagination);
        add(format!("{}/{{id}}", base), HttpMethod::Get, get_by_id);
        add(format!("{}/{{id}}", base), HttpMethod::Delete, delete);

        let components = ComponentsBuilder::new()
            .schema(R::View::name(), R::View::schema())
            .schema(R::Create::name(), R::Create::schema())
            .schema(R::Update::name(), R::Update::schema())
            .build();

        OpenApiBuilder::new()
            .paths(paths)
            .components(Some(components))
            .tags(Some(vec![TagBuilder::new().name(name).build()]))
            .build()
    }
}
