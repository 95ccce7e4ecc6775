//! Column sets for the operations tables.

use super::{FieldRegistry, FieldSpec};

/// Listing assignments as returned by `/assignments`.
pub fn assignments() -> FieldRegistry {
    FieldRegistry::new()
        .with(FieldSpec::date("date", "createdAt").with_label("Date"))
        .with(FieldSpec::text("productTitle", "task.productTitle").with_label("Title"))
        .with(FieldSpec::text("supplierLink", "task.supplierLink").with_label("Link"))
        .with(FieldSpec::number("sourcePrice", "task.sourcePrice").with_label("Source Price"))
        .with(FieldSpec::number("sellingPrice", "task.sellingPrice").with_label("Selling Price"))
        .with(FieldSpec::text("sourcePlatform", "task.sourcePlatform.name").with_label("Source Platform"))
        .with(FieldSpec::text("range", "task.range").with_label("Range"))
        .with(FieldSpec::text("category", "task.category").with_label("Category"))
        .with(FieldSpec::text("createdByTask", "task.createdBy.username").with_label("Created By"))
        .with(FieldSpec::text("listingPlatform", "listingPlatform.name").with_label("Listing Platform"))
        .with(FieldSpec::text("store", "store.name").with_label("Store"))
        .with(FieldSpec::number("quantity", "quantity").with_label("Quantity"))
        .with(FieldSpec::text("lister", "lister.username").with_label("Lister"))
        .with(FieldSpec::text("sharedBy", "createdBy.username").with_label("Shared By"))
}

/// Listing tasks as returned by `/tasks`, grouped by store in analytics.
pub fn tasks() -> FieldRegistry {
    FieldRegistry::new()
        .with(FieldSpec::date("date", "date").with_label("Date"))
        .with(FieldSpec::text("storeId", "store._id"))
        .with(FieldSpec::text("store", "store.name").with_label("Store"))
        .with(FieldSpec::text("platform", "listingPlatform.name").with_label("Platform"))
        .with(FieldSpec::text("listerId", "assignedLister._id"))
        .with(FieldSpec::text("range", "range").with_label("Range"))
        .with(FieldSpec::text("category", "category").with_label("Category"))
        .with(FieldSpec::number("quantity", "quantity").with_label("Quantity"))
        .with(FieldSpec::text("status", "status").with_label("Status"))
}

/// Rows of the listing-completion sheet.
pub fn listing_sheet() -> FieldRegistry {
    FieldRegistry::new()
        .with(FieldSpec::date("date", "date").with_label("Date"))
        .with(FieldSpec::text("platform", "platform").with_label("Platform"))
        .with(FieldSpec::text("store", "store").with_label("Store"))
        .with(FieldSpec::text("marketplace", "marketplace").with_label("Marketplace"))
        .with(FieldSpec::text("category", "category").with_label("Category"))
        .with(FieldSpec::text("subcategory", "subcategory").with_label("Subcategory"))
        .with(FieldSpec::text("range", "range").with_label("Range"))
        .with(FieldSpec::number("quantity", "quantity").with_label("Quantity"))
}
