/*!
 * Built-in Configuration
 * Five processes over three resource types with totals (10, 5, 7)
 */

use super::document::ConfigDocument;
use crate::state::MatrixState;

/// The built-in configuration used when no file is supplied
pub fn classic_document() -> ConfigDocument {
    ConfigDocument {
        num_proc: 5,
        num_res: 3,
        available: None,
        resources: Some(vec![10, 5, 7]),
        allocation: vec![
            vec![0, 1, 0],
            vec![2, 0, 0],
            vec![3, 0, 2],
            vec![2, 1, 1],
            vec![0, 0, 2],
        ],
        max: vec![
            vec![7, 5, 3],
            vec![3, 2, 2],
            vec![9, 0, 2],
            vec![2, 2, 2],
            vec![4, 3, 3],
        ],
    }
}

/// [`classic_document`] as a validated state; available is (3, 3, 2)
pub fn classic_state() -> MatrixState {
    classic_document()
        .to_state()
        .expect("built-in configuration is valid")
}
