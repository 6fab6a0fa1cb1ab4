use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{
            AdminCreateSupplierRequest, AdminUpdateSupplierRequest, ClearDebtRequest,
            ClearDebtResult, CreateUserRequest, SupplierRowList, UpdateUserRequest, UserList,
        },
        auth::{AccessToken, TokenObtainRequest, TokenPair, TokenRefreshRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        suppliers::{CreateSupplierRequest, SupplierList, UpdateSupplierRequest},
    },
    entity::SupplierType,
    models::{Product, Supplier, SupplierRow, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, health, products, suppliers},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::obtain_token,
        auth::refresh_token,
        suppliers::list_suppliers,
        suppliers::create_supplier,
        suppliers::get_supplier,
        suppliers::update_supplier,
        suppliers::replace_supplier,
        suppliers::delete_supplier,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        admin::list_suppliers,
        admin::create_supplier,
        admin::update_supplier,
        admin::delete_supplier,
        admin::clear_debt,
        admin::list_products,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::list_users,
        admin::create_user,
        admin::update_user
    ),
    components(
        schemas(
            SupplierType,
            Supplier,
            SupplierRow,
            Product,
            User,
            CreateSupplierRequest,
            UpdateSupplierRequest,
            AdminCreateSupplierRequest,
            AdminUpdateSupplierRequest,
            ClearDebtRequest,
            ClearDebtResult,
            CreateProductRequest,
            UpdateProductRequest,
            CreateUserRequest,
            UpdateUserRequest,
            TokenObtainRequest,
            TokenRefreshRequest,
            TokenPair,
            AccessToken,
            SupplierList,
            SupplierRowList,
            ProductList,
            UserList,
            Meta,
            ApiResponse<Supplier>,
            ApiResponse<SupplierList>,
            ApiResponse<SupplierRowList>,
            ApiResponse<Product>,
            ApiResponse<ProductList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Token endpoints"),
        (name = "Suppliers", description = "Supplier endpoints"),
        (name = "Products", description = "Product endpoints, mounted when PRODUCTS_API_ENABLED is set"),
        (name = "Admin", description = "Operator endpoints, staff only"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
