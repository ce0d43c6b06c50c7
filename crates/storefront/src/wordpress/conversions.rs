//! Conversions from generated GraphQL types to domain types.
//!
//! `graphql_client` emits a separate copy of each fragment per operation
//! module, so the fragment conversions are stamped out per module by the
//! macros below. The field mapping itself lives in plain functions.
//!
//! Nodes missing a required field (name, slug) are dropped rather than
//! failing the whole response.

use pressfront_core::{
    Cart, CartItem, CartTotals, Category, Image, OrderId, OrderStatus, Product, ProductId,
    VariationId, parse_lowest_price,
};
use rust_decimal::Decimal;

use super::queries::{
    add_to_cart, get_account, get_cart, get_page_by_uri, get_product_by_slug, get_products,
    remove_items_from_cart, update_item_quantities,
};
use super::types::{OrderSummary, Page, ProductDetail, Viewer};

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn image(source_url: Option<String>, alt_text: Option<String>) -> Option<Image> {
    Some(Image {
        url: non_empty(source_url)?,
        alt_text: non_empty(alt_text),
    })
}

fn category(slug: Option<String>, name: Option<String>) -> Option<Category> {
    let slug = non_empty(slug)?;
    let name = non_empty(name).unwrap_or_else(|| slug.clone());
    Some(Category { slug, name })
}

/// Price strings exposed by the concrete product type.
#[derive(Debug, Default)]
struct Pricing {
    price: Option<String>,
    regular_price: Option<String>,
    sale_price: Option<String>,
}

/// Fields shared by every product selection, already unwrapped.
struct ProductParts {
    id: i64,
    name: Option<String>,
    slug: Option<String>,
    on_sale: Option<bool>,
    short_description: Option<String>,
    image: Option<Image>,
    categories: Vec<Category>,
    sizes: Vec<String>,
    colors: Vec<String>,
    pricing: Pricing,
}

/// `None` when name or slug is missing.
fn product(parts: ProductParts) -> Option<Product> {
    Some(Product {
        id: ProductId::new(parts.id),
        name: non_empty(parts.name)?,
        slug: non_empty(parts.slug)?,
        price: parts.pricing.price,
        regular_price: parts.pricing.regular_price,
        sale_price: parts.pricing.sale_price,
        on_sale: parts.on_sale.unwrap_or(false),
        categories: parts.categories,
        sizes: parts.sizes,
        colors: parts.colors,
        image: parts.image,
        short_description: non_empty(parts.short_description),
    })
}

macro_rules! product_fields_conversion {
    ($($module:ident),+ $(,)?) => {$(
        impl $module::ProductFields {
            fn into_product(self) -> Option<Product> {
                let pricing = match self.on {
                    $module::ProductFieldsOn::SimpleProduct(p) => Pricing {
                        price: p.price,
                        regular_price: p.regular_price,
                        sale_price: p.sale_price,
                    },
                    $module::ProductFieldsOn::VariableProduct(p) => Pricing {
                        price: p.price,
                        regular_price: p.regular_price,
                        sale_price: p.sale_price,
                    },
                    $module::ProductFieldsOn::ExternalProduct(p) => Pricing {
                        price: p.price,
                        regular_price: p.regular_price,
                        sale_price: p.sale_price,
                    },
                    #[allow(unreachable_patterns)]
                    _ => Pricing::default(),
                };

                product(ProductParts {
                    id: self.database_id,
                    name: self.name,
                    slug: self.slug,
                    on_sale: self.on_sale,
                    short_description: self.short_description,
                    image: self.image.and_then(|i| image(i.source_url, i.alt_text)),
                    categories: self
                        .product_categories
                        .map(|c| c.nodes)
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(|t| category(t.slug, t.name))
                        .collect(),
                    sizes: self
                        .all_pa_size
                        .map(|c| c.nodes)
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(|t| non_empty(t.name))
                        .collect(),
                    colors: self
                        .all_pa_color
                        .map(|c| c.nodes)
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(|t| non_empty(t.name))
                        .collect(),
                    pricing,
                })
            }
        }
    )+};
}

product_fields_conversion!(get_products, get_product_by_slug);

/// Convert a catalog node; `None` when name or slug is missing.
pub fn convert_product(node: get_products::ProductFields) -> Option<Product> {
    node.into_product()
}

pub fn convert_product_detail(
    node: get_product_by_slug::GetProductBySlugProduct,
) -> Option<ProductDetail> {
    let gallery = node
        .gallery_images
        .map(|c| c.nodes)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|i| image(i.source_url, i.alt_text))
        .collect();

    Some(ProductDetail {
        product: node.product_fields.into_product()?,
        description: non_empty(node.description),
        gallery,
    })
}

/// Parse a formatted money string, treating anything unparseable as zero.
fn money(value: Option<&str>) -> Decimal {
    value
        .and_then(|v| parse_lowest_price(v).ok())
        .unwrap_or(Decimal::ZERO)
}

/// One cart line, already unwrapped from its edges.
struct CartLineParts {
    key: String,
    quantity: Option<i64>,
    subtotal: Option<String>,
    product_id: i64,
    variation_id: Option<i64>,
    name: Option<String>,
    slug: Option<String>,
    image: Option<Image>,
}

/// `None` for lines without a positive quantity.
fn cart_item(parts: CartLineParts) -> Option<CartItem> {
    let quantity = parts
        .quantity
        .and_then(|q| u32::try_from(q).ok())
        .filter(|q| *q > 0)?;
    let subtotal = money(parts.subtotal.as_deref());
    let price = subtotal / Decimal::from(quantity);

    Some(CartItem {
        key: parts.key,
        product_id: ProductId::new(parts.product_id),
        variation_id: parts.variation_id.map(VariationId::new),
        name: non_empty(parts.name).unwrap_or_default(),
        slug: non_empty(parts.slug).unwrap_or_default(),
        quantity,
        price: price.round_dp(2),
        subtotal,
        image: parts.image,
    })
}

fn cart_totals(
    subtotal: Option<&str>,
    tax: Option<&str>,
    shipping: Option<&str>,
    total: Option<&str>,
) -> CartTotals {
    CartTotals {
        subtotal: money(subtotal),
        tax: money(tax),
        shipping: money(shipping),
        total: money(total),
    }
}

macro_rules! cart_fields_conversion {
    ($($module:ident),+ $(,)?) => {$(
        impl From<$module::CartFields> for Cart {
            fn from(node: $module::CartFields) -> Self {
                let items = node
                    .contents
                    .map(|c| c.nodes)
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|line| {
                        let product = line.product?.node;
                        cart_item(CartLineParts {
                            key: line.key,
                            quantity: line.quantity,
                            subtotal: line.subtotal,
                            product_id: product.database_id,
                            variation_id: line.variation.map(|v| v.node.database_id),
                            name: product.name,
                            slug: product.slug,
                            image: product.image.and_then(|i| image(i.source_url, i.alt_text)),
                        })
                    })
                    .collect();

                let totals = cart_totals(
                    node.subtotal.as_deref(),
                    node.total_tax.as_deref(),
                    node.shipping_total.as_deref(),
                    node.total.as_deref(),
                );

                Self::from_items(items, totals)
            }
        }
    )+};
}

cart_fields_conversion!(
    get_cart,
    add_to_cart,
    update_item_quantities,
    remove_items_from_cart,
);

/// Convert the WooGraphQL cart into a [`Cart`] snapshot.
pub fn convert_cart(node: impl Into<Cart>) -> Cart {
    node.into()
}

pub fn convert_page(node: get_page_by_uri::GetPageByUriPage) -> Page {
    Page {
        id: node.database_id,
        title: node.title.unwrap_or_default(),
        content: node.content.unwrap_or_default(),
        uri: node.uri.unwrap_or_default(),
    }
}

pub fn convert_viewer(node: get_account::GetAccountViewer) -> Viewer {
    Viewer {
        id: node.database_id,
        name: non_empty(node.name).unwrap_or_else(|| "Customer".to_string()),
        email: non_empty(node.email),
    }
}

const fn order_status(status: &get_account::OrderStatusEnum) -> Option<OrderStatus> {
    use get_account::OrderStatusEnum as S;
    match status {
        S::PENDING => Some(OrderStatus::Pending),
        S::PROCESSING => Some(OrderStatus::Processing),
        S::ON_HOLD => Some(OrderStatus::OnHold),
        S::COMPLETED => Some(OrderStatus::Completed),
        S::CANCELLED => Some(OrderStatus::Cancelled),
        S::REFUNDED => Some(OrderStatus::Refunded),
        S::FAILED => Some(OrderStatus::Failed),
        S::CHECKOUT_DRAFT => Some(OrderStatus::CheckoutDraft),
        S::Other(_) => None,
    }
}

pub fn convert_order(node: get_account::GetAccountCustomerOrdersNodes) -> OrderSummary {
    OrderSummary {
        id: OrderId::new(node.database_id),
        number: non_empty(node.order_number).unwrap_or_else(|| node.database_id.to_string()),
        date: non_empty(node.date),
        status: node.status.as_ref().and_then(order_status),
        total: node.total.unwrap_or_default(),
    }
}
