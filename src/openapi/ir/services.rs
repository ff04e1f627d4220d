//! Service building: operations grouped by their first tag.

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::openapi::spec::{Method, Operation as SpecOperation, Parameter, RefOr};

use super::operations::{OperationContext, get_operation};
use super::types::{Model, Service};

/// Build every operation in the document and group them into services.
///
/// Services appear in the order their first operation is declared, and each
/// service keeps its operations in declaration order. Operations are built in
/// parallel; the ordered collect keeps the result deterministic.
pub fn get_services(ctx: OperationContext<'_>) -> (Vec<Service>, Vec<Model>) {
    let jobs: Vec<(&String, Method, &SpecOperation, &[RefOr<Parameter>])> = ctx
        .doc
        .paths
        .iter()
        .flat_map(|(path, item)| {
            item.operations
                .iter()
                .map(move |(method, op)| (path, *method, op, item.parameters.as_slice()))
        })
        .collect();

    let built: Vec<_> = jobs
        .par_iter()
        .map(|(path, method, op, path_level)| get_operation(ctx, path, *method, op, path_level))
        .collect();

    let mut services: IndexMap<String, Service> = IndexMap::new();
    let mut hoisted = Vec::new();
    for (operation, models) in built {
        hoisted.extend(models);
        services
            .entry(operation.service.clone())
            .or_insert_with(|| Service {
                name: operation.service.clone(),
                operations: Vec::new(),
                imports: Vec::new(),
            })
            .operations
            .push(operation);
    }

    (services.into_values().collect(), hoisted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::models::PromotedResponses;
    use crate::openapi::spec::Document;

    fn services_of(doc: &Document) -> Vec<Service> {
        let promoted = PromotedResponses::new();
        get_services(OperationContext {
            doc,
            promoted: &promoted,
        })
        .0
    }

    #[test]
    fn test_grouping_by_first_tag_in_declaration_order() {
        let doc: Document = serde_json::from_str(
            r#"{
                "openapi": "3.0.0",
                "paths": {
                    "/users": { "get": { "operationId": "listUsers", "tags": ["users"] } },
                    "/pets": {
                        "get": { "operationId": "listPets", "tags": ["pets", "users"] },
                        "post": { "operationId": "createPet", "tags": ["pets"] }
                    },
                    "/health": { "get": { "operationId": "health" } },
                    "/users/{id}": { "delete": { "operationId": "deleteUser", "tags": ["users"] } }
                }
            }"#,
        )
        .unwrap();
        let services = services_of(&doc);
        let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Users", "Pets", "Default"]);
        let users: Vec<&str> = services[0].operations.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(users, ["listUsers", "deleteUser"]);
        let pets: Vec<&str> = services[1].operations.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(pets, ["listPets", "createPet"]);
    }
}
