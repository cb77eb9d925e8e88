use std::collections::BTreeSet;

/// Describes one committed write so the invalidation policy can work out
/// which cached views went stale.
///
/// Adding an ID also raises its resource flag, so a known ID is never left
/// out of the eviction set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeDescriptor {
    pub product: bool,
    pub order: bool,
    pub admin: bool,
    pub product_ids: BTreeSet<String>,
    pub order_id: Option<String>,
    pub user_id: Option<String>,
}

impl ChangeDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog listings changed
    pub fn products() -> Self {
        Self::new().with_products_changed()
    }

    /// Order listings changed
    pub fn orders() -> Self {
        Self::new().with_orders_changed()
    }

    /// Only admin aggregates changed
    pub fn admin() -> Self {
        Self::new().with_admin()
    }

    pub fn with_products_changed(mut self) -> Self {
        self.product = true;
        self
    }

    pub fn with_orders_changed(mut self) -> Self {
        self.order = true;
        self
    }

    pub fn with_admin(mut self) -> Self {
        self.admin = true;
        self
    }

    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.product = true;
        self.product_ids.insert(product_id.into());
        self
    }

    pub fn with_products<I, S>(self, product_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        product_ids
            .into_iter()
            .fold(self, |descriptor, id| descriptor.with_product(id))
    }

    pub fn with_order(mut self, order_id: impl Into<String>) -> Self {
        self.order = true;
        self.order_id = Some(order_id.into());
        self
    }

    /// Whose per-user order list is affected
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.order = true;
        self.user_id = Some(user_id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.product && !self.order && !self.admin
    }
}
