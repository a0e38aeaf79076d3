/*!
 * Allocation State
 * Resource vectors and the matrix state owned by the admission engine
 */

mod matrix;
mod vector;

pub use matrix::MatrixState;
pub use vector::ResourceVector;
