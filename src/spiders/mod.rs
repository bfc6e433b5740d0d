mod css_spider;
mod path_spider;

pub use css_spider::CssProductSpider;
pub use path_spider::PathProductSpider;

pub const START_URL: &str = "https://webscraper.io/test-sites/e-commerce/allinone";

#[cfg(test)]
pub(crate) mod fixtures {
    /// Two products and a subcategory link.
    pub const LISTING: &str = r#"
        <html><body>
          <div class="row">
            <div class="thumbnail">
              <div class="caption">
                <h4 class="pull-right price">$10</h4>
                <h4><a class="title" href="/product/1">Item A</a></h4>
                <p class="description">red</p>
              </div>
            </div>
            <div class="thumbnail">
              <div class="caption">
                <h4 class="pull-right price">$20</h4>
                <h4><a class="title" href="/product/2">Item B</a></h4>
              </div>
            </div>
          </div>
          <a class="subcategory-link" href="/next">Laptops</a>
        </body></html>
    "#;

    /// Three products, the last one without a description, and both link kinds.
    pub const UNEVEN: &str = r#"
        <html><body>
          <a class="category-link" href="/cat">Computers</a>
          <a class="subcategory-link " href="/sub">Tablets</a>
          <div class="thumbnail">
            <h4 class="price">$1</h4><a class="title">One</a><p class="description">first</p>
          </div>
          <div class="thumbnail">
            <h4 class="price">$2</h4><a class="title">Two</a><p class="description">second</p>
          </div>
          <div class="thumbnail">
            <h4 class="price">$3</h4><a class="title">Three</a>
          </div>
        </body></html>
    "#;

    /// Same three products, all described, and only a category link.
    pub const EVEN: &str = r#"
        <html><body>
          <a class="category-link" href="/cat">Computers</a>
          <div class="thumbnail">
            <h4 class="price">$1</h4><a class="title">One</a><p class="description">first</p>
          </div>
          <div class="thumbnail">
            <h4 class="price">$2</h4><a class="title">Two</a><p class="description">second</p>
          </div>
          <div class="thumbnail">
            <h4 class="price">$3</h4><a class="title">Three</a><p class="description">third</p>
          </div>
        </body></html>
    "#;

    /// Both link kinds but no products.
    pub const LINKS_ONLY: &str = r#"
        <html><body>
          <a class="category-link" href="/cat">Computers</a>
          <a class="subcategory-link" href="/sub">Tablets</a>
          <p>No products here</p>
        </body></html>
    "#;

    /// A subcategory link with an empty href next to a category link.
    pub const EMPTY_SUBCATEGORY_HREF: &str = r#"
        <html><body>
          <a class="category-link" href="/cat">Computers</a>
          <a class="subcategory-link" href="">Tablets</a>
        </body></html>
    "#;

    /// Navigation only.
    pub const EMPTY_LISTING: &str = r#"
        <html><body><p>No products here</p></body></html>
    "#;
}
