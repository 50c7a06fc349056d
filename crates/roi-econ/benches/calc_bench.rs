use criterion::{black_box, criterion_group, criterion_main, Criterion};
use roi_econ::{
    calculate_churn, calculate_conversion, calculate_support, CalculatorProfiles, ChurnForm,
    ConversionForm, SupportForm,
};

fn bench_calculators(c: &mut Criterion) {
    let profiles = CalculatorProfiles::embedded().unwrap();
    let support = SupportForm::default().resolve(&profiles);
    let basis = profiles.support.reduction_basis;
    let (churn, _) = ChurnForm::default().resolve(&profiles);
    let (conversion, _) = ConversionForm::default().resolve(&profiles);

    c.bench_function("support calculator", |b| {
        b.iter(|| calculate_support(black_box(&support), basis))
    });
    c.bench_function("churn calculator", |b| {
        b.iter(|| calculate_churn(black_box(&churn)))
    });
    c.bench_function("conversion calculator", |b| {
        b.iter(|| calculate_conversion(black_box(&conversion)))
    });
}

fn bench_form_resolution(c: &mut Criterion) {
    let profiles = CalculatorProfiles::embedded().unwrap();
    let form = ChurnForm {
        customers: Some("1740".into()),
        arpc: Some("75".into()),
        churn_rate: Some("7.5".into()),
    };
    c.bench_function("churn form snap + clamp", |b| {
        b.iter(|| black_box(&form).resolve(&profiles))
    });
}

criterion_group!(benches, bench_calculators, bench_form_resolution);
criterion_main!(benches);
