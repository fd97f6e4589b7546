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
    domain::{BulkAction, Earnings, OrderStatus, ProductStatus, Role},
    dto::{
        admin, auth as auth_dto, categories as category_dto, messages as message_dto,
        official as official_dto, orders as order_dto, products, users as user_dto,
        vendors as vendor_dto,
    },
    models::{AuditLog, Category, Message, Order, OrderItem, Product, User, VendorProfile},
    response::{ApiResponse, Meta},
    routes::{
        admin as admin_routes, auth, categories, health, messages, official, orders, params,
        products as product_routes, users, vendor, vendors,
    },
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
        auth::register,
        auth::login,
        users::me,
        users::update_me,
        vendors::list_vendors,
        vendors::get_vendor,
        vendor::dashboard,
        vendor::list_orders,
        vendor::list_products,
        categories::list_categories,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::set_product_status,
        product_routes::delete_product,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order_status,
        orders::cancel_order,
        messages::list_conversations,
        messages::send_message,
        messages::get_thread,
        messages::mark_thread_read,
        admin_routes::dashboard,
        admin_routes::list_users,
        admin_routes::set_user_active,
        admin_routes::list_pending_vendors,
        admin_routes::approve_vendor,
        admin_routes::revoke_vendor,
        admin_routes::create_category,
        admin_routes::list_all_orders,
        admin_routes::get_order_admin,
        admin_routes::update_order_status,
        admin_routes::list_low_stock,
        admin_routes::adjust_inventory,
        admin_routes::list_audit_logs,
        official::list_products,
        official::create_product,
        official::stats,
        official::bulk_action
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            ProductStatus,
            BulkAction,
            Earnings,
            User,
            VendorProfile,
            Category,
            Product,
            Order,
            OrderItem,
            Message,
            AuditLog,
            auth_dto::RegisterRequest,
            auth_dto::LoginRequest,
            auth_dto::LoginResponse,
            user_dto::UpdateProfileRequest,
            user_dto::SetActiveRequest,
            user_dto::UserList,
            vendor_dto::VendorList,
            vendor_dto::VendorDetail,
            vendor_dto::VendorDashboard,
            category_dto::CreateCategoryRequest,
            category_dto::CategoryList,
            products::CreateProductRequest,
            products::UpdateProductRequest,
            products::SetProductStatusRequest,
            products::ProductList,
            products::DeleteOutcome,
            products::DeleteProductResponse,
            order_dto::OrderLineRequest,
            order_dto::CreateOrderRequest,
            order_dto::UpdateOrderStatusRequest,
            order_dto::OrderWithItems,
            order_dto::OrderList,
            message_dto::SendMessageRequest,
            message_dto::ConversationSummary,
            message_dto::ConversationList,
            message_dto::MessageList,
            message_dto::MarkReadResponse,
            admin::AdminDashboard,
            admin::InventoryAdjustRequest,
            admin::AuditLogList,
            official_dto::BulkActionRequest,
            official_dto::BulkActionResult,
            official_dto::OfficialStats,
            params::Pagination,
            params::SortOrder,
            params::ProductSortBy,
            Meta,
            ApiResponse<Product>,
            ApiResponse<products::ProductList>,
            ApiResponse<order_dto::OrderWithItems>,
            ApiResponse<order_dto::OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Own profile"),
        (name = "Vendors", description = "Public vendor directory"),
        (name = "Vendor", description = "Vendor workspace"),
        (name = "Categories", description = "Product categories"),
        (name = "Products", description = "Product catalog"),
        (name = "Orders", description = "Order placement and tracking"),
        (name = "Messages", description = "Buyer and vendor messaging"),
        (name = "Admin", description = "Admin endpoints"),
        (name = "Official", description = "Bazario official product line"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
