use lambda_runtime::Error;
use medsent_ai::ModelKind;

#[tokio::main]
async fn main() -> Result<(), Error> {
    medsent_lambda::init_tracing();
    medsent_lambda::serve(ModelKind::Transformer, "distilbert-sentiment-v1").await
}
