use std::sync::Arc;

use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, options: &'a [&'a str]) -> &'a str {
        options[(self.next_u64() % options.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const N_ROWS: usize = 500;

fn main() {
    let mut rng = SimpleRng::new(42);

    let jobs = ["admin", "technician", "services", "management", "retired"];
    let maritals = ["married", "single", "divorced"];
    let educations = ["primary", "secondary", "tertiary"];
    let deposits = ["yes", "no"];

    let mut age: Vec<i64> = Vec::with_capacity(N_ROWS);
    let mut job: Vec<String> = Vec::with_capacity(N_ROWS);
    let mut marital: Vec<String> = Vec::with_capacity(N_ROWS);
    let mut education: Vec<String> = Vec::with_capacity(N_ROWS);
    let mut balance: Vec<f64> = Vec::with_capacity(N_ROWS);
    let mut housing: Vec<bool> = Vec::with_capacity(N_ROWS);
    let mut deposit: Vec<String> = Vec::with_capacity(N_ROWS);

    for _ in 0..N_ROWS {
        let j = rng.pick(&jobs);
        let a = if j == "retired" {
            rng.gauss(68.0, 5.0).clamp(60.0, 90.0)
        } else {
            rng.gauss(40.0, 10.0).clamp(18.0, 65.0)
        };
        age.push(a.round() as i64);
        job.push(j.to_string());
        marital.push(rng.pick(&maritals).to_string());
        education.push(rng.pick(&educations).to_string());
        balance.push((rng.gauss(1500.0, 1200.0)).round());
        housing.push(rng.next_f64() < 0.55);
        deposit.push(rng.pick(&deposits).to_string());
    }

    write_csv(&age, &job, &marital, &education, &balance, &housing, &deposit);
    write_parquet(&age, &job, &marital, &education, &balance, &housing, &deposit);
}

fn write_csv(
    age: &[i64],
    job: &[String],
    marital: &[String],
    education: &[String],
    balance: &[f64],
    housing: &[bool],
    deposit: &[String],
) {
    let output_path = "banking.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create CSV file");
    writer
        .write_record([
            "age",
            "job",
            "marital",
            "education",
            "balance",
            "housing",
            "deposit",
        ])
        .expect("Failed to write CSV header");

    for i in 0..age.len() {
        writer
            .write_record([
                age[i].to_string(),
                job[i].clone(),
                marital[i].clone(),
                education[i].clone(),
                balance[i].to_string(),
                housing[i].to_string(),
                deposit[i].clone(),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV");

    println!("Wrote {} rows to {output_path}", age.len());
}

fn write_parquet(
    age: &[i64],
    job: &[String],
    marital: &[String],
    education: &[String],
    balance: &[f64],
    housing: &[bool],
    deposit: &[String],
) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("age", DataType::Int64, false),
        Field::new("job", DataType::Utf8, false),
        Field::new("marital", DataType::Utf8, false),
        Field::new("education", DataType::Utf8, false),
        Field::new("balance", DataType::Float64, false),
        Field::new("housing", DataType::Boolean, false),
        Field::new("deposit", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(age.to_vec())),
            Arc::new(StringArray::from(
                job.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                marital.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                education.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(balance.to_vec())),
            Arc::new(BooleanArray::from(housing.to_vec())),
            Arc::new(StringArray::from(
                deposit.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
        ],
    )
    .expect("Failed to create RecordBatch");

    let output_path = "banking.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {} rows to {output_path}", age.len());
}
