mod common;
mod insights;
mod routing;
