//! Validation utilities for replenishment settings and inputs

// ============================================================================
// Notification Settings
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.')
    {
        return Err("Invalid email format");
    }
    if email.chars().any(char::is_whitespace) {
        return Err("Email must not contain whitespace");
    }
    Ok(())
}

/// Validate an absolute http(s) URL (basic check)
pub fn validate_http_url(url: &str) -> Result<(), &'static str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or("URL must start with http:// or https://")?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err("URL must include a host");
    }
    Ok(())
}

// ============================================================================
// Stock Quantities
// ============================================================================

/// Validate a stock quantity is finite and not negative
pub fn validate_quantity(quantity: f64) -> Result<(), &'static str> {
    if !quantity.is_finite() {
        return Err("Quantity must be a finite number");
    }
    if quantity < 0.0 {
        return Err("Quantity cannot be negative");
    }
    Ok(())
}
