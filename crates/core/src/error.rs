use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::QuestionError;
use crate::options::OptionSetError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Options(#[from] OptionSetError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
